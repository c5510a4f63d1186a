// The tree handed over by the parser. Every stage of the backend reads it
// positionally: a node's meaning is given by its label plus the position of
// its children, never by named fields.

#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Label {
    Prog,
    DeclVars,
    DeclFoncts,
    DeclFonct,
    EnTeteFonct,
    Corps,
    ListTypVar,
    SuiteInstr,
    EmptyInstr,
    Type,
    Void,
    DeclArray,
    DeclFonctArray,
    Ident,
    ArrayLR,
    EmptyArgs,
    ListExp,
    Num,
    Character,
    Addsub,
    Divstar,
    Eq,
    Order,
    And,
    Or,
    Not,
    Assignation,
    If,
    While,
    Return,
}

#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub enum Attribute {
    #[default]
    Empty,
    // identifiers, array declarations and indexed accesses
    Ident(String),
    // "int" / "char" on type nodes
    KeyWord(String),
    Num(i32),
    // character literals and arithmetic operators
    Byte(u8),
    // "==", "!=", "<", "<=", ">", ">="
    Comp(String),
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Node {
    pub label: Label,
    pub attribute: Attribute,
    pub children: Vec<Node>,
    pub line: usize,
    pub column: usize,
}

impl Node {
    pub fn new(label: Label) -> Self {
        Self {
            label,
            attribute: Attribute::Empty,
            children: Vec::new(),
            line: 0,
            column: 0,
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attribute = attribute;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    pub fn child(&self, position: usize) -> &Node {
        match self.children.get(position) {
            Some(child) => child,
            None => panic!(
                "{:?} node at {}:{} has no child at position {}",
                self.label, self.line, self.column, position
            ),
        }
    }

    pub fn get_child(&self, position: usize) -> Option<&Node> {
        self.children.get(position)
    }

    pub fn is(&self, label: Label) -> bool {
        self.label == label
    }

    pub fn ident(&self) -> &str {
        match &self.attribute {
            Attribute::Ident(name) => name,
            other => panic!("{:?} node carries {:?}, not an identifier", self.label, other),
        }
    }

    pub fn key_word(&self) -> &str {
        match &self.attribute {
            Attribute::KeyWord(word) => word,
            other => panic!("{:?} node carries {:?}, not a type keyword", self.label, other),
        }
    }

    pub fn num(&self) -> i32 {
        match self.attribute {
            Attribute::Num(n) => n,
            ref other => panic!("{:?} node carries {:?}, not a number", self.label, other),
        }
    }

    pub fn byte(&self) -> u8 {
        match self.attribute {
            Attribute::Byte(b) => b,
            ref other => panic!("{:?} node carries {:?}, not a byte", self.label, other),
        }
    }

    pub fn comp(&self) -> &str {
        match &self.attribute {
            Attribute::Comp(op) => op,
            other => panic!("{:?} node carries {:?}, not a comparator", self.label, other),
        }
    }

    // `f()` and `f(a, b)` are identifiers whose only child is the argument list
    pub fn is_call(&self) -> bool {
        self.label == Label::Ident
            && matches!(
                self.children.first().map(|c| c.label),
                Some(Label::EmptyArgs) | Some(Label::ListExp)
            )
    }

    // arguments of a call node, empty for `f()`
    pub fn call_args(&self) -> &[Node] {
        match self.children.first() {
            Some(list) if list.label == Label::ListExp => &list.children,
            _ => &[],
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Modulo,
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl BinaryOperator {
    // decode the operator carried by an `Addsub`, `Divstar`, `Eq` or `Order` node
    pub fn of(node: &Node) -> Self {
        match (node.label, &node.attribute) {
            (Label::Addsub, Attribute::Byte(b'+')) => BinaryOperator::Add,
            (Label::Addsub, Attribute::Byte(b'-')) => BinaryOperator::Sub,
            (Label::Divstar, Attribute::Byte(b'*')) => BinaryOperator::Mul,
            (Label::Divstar, Attribute::Byte(b'/')) => BinaryOperator::Div,
            (Label::Divstar, Attribute::Byte(b'%')) => BinaryOperator::Modulo,
            (Label::Eq | Label::Order, Attribute::Comp(op)) => match op.as_str() {
                "==" => BinaryOperator::Eq,
                "!=" => BinaryOperator::Neq,
                "<" => BinaryOperator::Lt,
                "<=" => BinaryOperator::Lte,
                ">" => BinaryOperator::Gt,
                ">=" => BinaryOperator::Gte,
                other => unreachable!("unknown comparator {}", other),
            },
            (label, attribute) => unreachable!("{:?} is not a binary operator ({:?})", label, attribute),
        }
    }

    pub fn is_comparison(&self) -> bool {
        !matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Sub
                | BinaryOperator::Mul
                | BinaryOperator::Div
                | BinaryOperator::Modulo
        )
    }
}

#[cfg(test)]
mod ast_tests {
    use crate::ast::{Attribute, BinaryOperator, Label, Node};

    #[test]
    fn call_detection_test() {
        let var = Node::new(Label::Ident).with_attribute(Attribute::Ident("f".into()));
        assert!(!var.is_call());

        let call = var.clone().with_child(Node::new(Label::EmptyArgs));
        assert!(call.is_call());
        assert!(call.call_args().is_empty());

        let call = var.with_child(
            Node::new(Label::ListExp).with_child(Node::new(Label::Num).with_attribute(Attribute::Num(1))),
        );
        assert_eq!(call.call_args().len(), 1);
    }

    #[test]
    fn operator_decoding_test() {
        let minus = Node::new(Label::Addsub).with_attribute(Attribute::Byte(b'-'));
        assert_eq!(BinaryOperator::of(&minus), BinaryOperator::Sub);

        let lte = Node::new(Label::Order).with_attribute(Attribute::Comp("<=".into()));
        assert_eq!(BinaryOperator::of(&lte), BinaryOperator::Lte);
        assert!(BinaryOperator::of(&lte).is_comparison());
    }
}
