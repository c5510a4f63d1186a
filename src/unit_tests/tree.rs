// Shorthand for building the trees the parser would hand over.

use crate::ast::{Attribute, Label, Node};

pub fn ident(name: &str) -> Node {
    Node::new(Label::Ident).with_attribute(Attribute::Ident(name.to_string()))
}

pub fn num(n: i32) -> Node {
    Node::new(Label::Num).with_attribute(Attribute::Num(n))
}

pub fn chr(c: u8) -> Node {
    Node::new(Label::Character).with_attribute(Attribute::Byte(c))
}

pub fn index(name: &str, at: Node) -> Node {
    Node::new(Label::ArrayLR)
        .with_attribute(Attribute::Ident(name.to_string()))
        .with_child(at)
}

pub fn call(name: &str, args: Vec<Node>) -> Node {
    let list = if args.is_empty() {
        Node::new(Label::EmptyArgs)
    } else {
        Node::new(Label::ListExp).with_children(args)
    };
    ident(name).with_child(list)
}

// `+ - * / %`
pub fn arith(op: u8, lhs: Node, rhs: Node) -> Node {
    let label = match op {
        b'+' | b'-' => Label::Addsub,
        _ => Label::Divstar,
    };
    Node::new(label)
        .with_attribute(Attribute::Byte(op))
        .with_children([lhs, rhs])
}

pub fn neg(operand: Node) -> Node {
    Node::new(Label::Addsub)
        .with_attribute(Attribute::Byte(b'-'))
        .with_child(operand)
}

pub fn pos(operand: Node) -> Node {
    Node::new(Label::Addsub)
        .with_attribute(Attribute::Byte(b'+'))
        .with_child(operand)
}

pub fn cmp(op: &str, lhs: Node, rhs: Node) -> Node {
    let label = match op {
        "==" | "!=" => Label::Eq,
        _ => Label::Order,
    };
    Node::new(label)
        .with_attribute(Attribute::Comp(op.to_string()))
        .with_children([lhs, rhs])
}

pub fn and(lhs: Node, rhs: Node) -> Node {
    Node::new(Label::And).with_children([lhs, rhs])
}

pub fn or(lhs: Node, rhs: Node) -> Node {
    Node::new(Label::Or).with_children([lhs, rhs])
}

pub fn not(operand: Node) -> Node {
    Node::new(Label::Not).with_child(operand)
}

pub fn assign(target: Node, value: Node) -> Node {
    Node::new(Label::Assignation).with_children([target, value])
}

pub fn if_(cond: Node, then: Node, otherwise: Option<Node>) -> Node {
    Node::new(Label::If)
        .with_children([cond, then])
        .with_children(otherwise)
}

pub fn while_(cond: Node, body: Node) -> Node {
    Node::new(Label::While).with_children([cond, body])
}

pub fn ret(value: Option<Node>) -> Node {
    Node::new(Label::Return).with_children(value)
}

pub fn block(instrs: Vec<Node>) -> Node {
    Node::new(Label::SuiteInstr).with_children(instrs)
}

pub fn empty() -> Node {
    Node::new(Label::EmptyInstr)
}

// `int a, b[3];` is vars("int", vec![ident("a"), array("b", 3)])
pub fn vars(key_word: &str, declarators: Vec<Node>) -> Node {
    Node::new(Label::Type)
        .with_attribute(Attribute::KeyWord(key_word.to_string()))
        .with_children(declarators)
}

pub fn array(name: &str, length: i32) -> Node {
    Node::new(Label::DeclArray)
        .with_attribute(Attribute::Ident(name.to_string()))
        .with_child(num(length))
}

pub fn param(key_word: &str, name: &str) -> Node {
    vars(key_word, vec![ident(name)])
}

pub fn array_param(key_word: &str, name: &str) -> Node {
    Node::new(Label::DeclFonctArray)
        .with_attribute(Attribute::KeyWord(key_word.to_string()))
        .with_child(ident(name))
}

/// `None` as return type stands for `void`, an empty parameter list for `(void)`.
pub fn function(
    return_type: Option<&str>,
    name: &str,
    params: Vec<Node>,
    locals: Vec<Node>,
    body: Vec<Node>,
) -> Node {
    let return_node = match return_type {
        Some(key_word) => vars(key_word, vec![]),
        None => Node::new(Label::Void),
    };
    let param_list = if params.is_empty() {
        Node::new(Label::Void)
    } else {
        Node::new(Label::ListTypVar).with_children(params)
    };

    let header = Node::new(Label::EnTeteFonct).with_children([return_node, ident(name), param_list]);
    let corps = Node::new(Label::Corps).with_children([
        Node::new(Label::DeclVars).with_children(locals),
        block(body),
    ]);
    Node::new(Label::DeclFonct).with_children([header, corps])
}

pub fn program(globals: Vec<Node>, functions: Vec<Node>) -> Node {
    Node::new(Label::Prog).with_children([
        Node::new(Label::DeclVars).with_children(globals),
        Node::new(Label::DeclFoncts).with_children(functions),
    ])
}

// int main(void) { <body> }
pub fn main_with(locals: Vec<Node>, body: Vec<Node>) -> Node {
    function(Some("int"), "main", vec![], locals, body)
}
