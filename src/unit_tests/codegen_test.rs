#[cfg(test)]
mod codegen_tests {
    use crate::ast::Node;
    use crate::code_generator::asm::GeneratedCode;
    use crate::code_generator::stack_check::stack_depth;
    use crate::code_generator::x86_generate::{gen_x86_for_program, Expr, Generator};
    use crate::semantic_checker::semantic_check;
    use crate::symbol_table::builder::build_program;
    use crate::symbol_table::ScopeInfo;
    use crate::unit_tests::tree::*;
    use claims::{assert_ok, assert_ok_eq, assert_some};
    use indoc::indoc;
    use std::collections::HashSet;

    fn generate(root: &Node, emit_comments: bool) -> GeneratedCode {
        let (table, built) = build_program(root);
        assert!(built.is_empty(), "{}", built);
        let checked = assert_ok!(semantic_check(root, &table));
        assert!(!checked.has_errors(), "{}", checked);
        gen_x86_for_program(root, &table, emit_comments)
    }

    fn assembly(root: &Node) -> String {
        generate(root, false).to_string()
    }

    // indoc strips a fragment made only of instructions down to column 0
    fn code_lines(fragment: &str) -> String {
        fragment
            .lines()
            .map(|line| {
                if line.starts_with(' ') || line.ends_with(':') {
                    format!("{}\n", line)
                } else {
                    format!("    {}\n", line)
                }
            })
            .collect()
    }

    // from the label of `function` to the end
    fn body_of(asm: &str, function: &str) -> String {
        let start = assert_some!(asm.find(&format!("\n{}:\n", function))) + 1;
        asm[start..].to_string()
    }

    // globals: int t[3], g;   locals of main: int x, arr[2];
    fn expression_program(exprs: Vec<Node>) -> Node {
        let body = exprs
            .into_iter()
            .map(|e| assign(ident("x"), e))
            .chain(Some(ret(Some(num(0)))))
            .collect();
        program(
            vec![vars("int", vec![array("t", 3), ident("g")])],
            vec![
                function(
                    Some("int"),
                    "pick",
                    vec![array_param("int", "v"), param("int", "i")],
                    vec![],
                    vec![ret(Some(index("v", ident("i"))))],
                ),
                main_with(
                    vec![vars("int", vec![ident("x"), array("arr", 2)])],
                    body,
                ),
            ],
        )
    }

    fn sample_expressions() -> Vec<Node> {
        vec![
            num(42),
            chr(b'z'),
            ident("g"),
            index("t", num(2)),
            index("arr", arith(b'-', ident("x"), num(1))),
            neg(ident("x")),
            pos(ident("x")),
            pos(neg(num(4))),
            arith(b'*', arith(b'+', num(1), num(2)), arith(b'/', ident("g"), num(3))),
            arith(b'%', num(7), neg(num(3))),
            cmp("<=", ident("x"), ident("g")),
            cmp("!=", index("t", num(0)), num(0)),
            and(ident("x"), or(cmp("==", ident("g"), num(1)), not(ident("x")))),
            or(and(num(0), num(1)), num(1)),
            not(not(ident("g"))),
            call("getint", vec![]),
            call("pick", vec![ident("t"), num(1)]),
            arith(b'+', call("pick", vec![ident("arr"), num(0)]), call("getchar", vec![])),
        ]
    }

    #[test]
    fn void_call_and_return_zero() {
        // void f(void) {}  int main(void) { f(); return 0; }
        let root = program(
            vec![],
            vec![
                function(None, "f", vec![], vec![], vec![]),
                main_with(vec![], vec![call("f", vec![]), ret(Some(num(0)))]),
            ],
        );

        assert_eq!(
            assembly(&root),
            indoc! {"
                global _start
                extern show_registers
                extern show_stack
                extern putchar
                extern putint
                extern getchar
                extern getint
                section .bss
                global_vars: resb 0
                section .text
                _start:
                    call main
                    mov rdi, rax
                    mov rax, 60
                    syscall
                f:
                    push rbp
                    mov rbp, rsp
                    mov rsp, rbp
                    pop rbp
                    ret
                main:
                    push rbp
                    mov rbp, rsp
                    call f
                    push 0
                    pop rax
                    mov rsp, rbp
                    pop rbp
                    ret
            "}
        );
    }

    #[test]
    fn unary_plus_keeps_the_value() {
        // int main(void) { return +5 - -(+2); }
        let root = program(
            vec![],
            vec![main_with(
                vec![],
                vec![ret(Some(arith(b'-', pos(num(5)), neg(pos(num(2))))))],
            )],
        );
        let asm = assembly(&root);

        assert_eq!(
            body_of(&asm, "main"),
            indoc! {"
                main:
                    push rbp
                    mov rbp, rsp
                    push 5
                    push 2
                    pop rax
                    neg rax
                    push rax
                    pop rcx
                    pop rax
                    sub rax, rcx
                    push rax
                    pop rax
                    mov rsp, rbp
                    pop rbp
                    ret
            "}
        );
        assert_eq!(asm.matches("neg rax").count(), 1);
        assert_ok_eq!(stack_depth(&generate(&root, false).codes), 0);
    }

    #[test]
    fn every_expression_leaves_one_word() {
        let root = expression_program(vec![]);
        let (table, _) = build_program(&root);
        let main = assert_some!(table.function("main"));
        let scope = ScopeInfo::new(&table, main);

        for expr in sample_expressions() {
            let mut code = GeneratedCode::new(false);
            let _ = Expr(&expr).generate(&scope, &mut code, ());
            assert_ok_eq!(stack_depth(&code.codes), 1, "{:?}", expr);
        }
    }

    #[test]
    fn whole_program_is_balanced() {
        let mut root = expression_program(sample_expressions());
        let main_body = &mut root.children[1].children[1].children[1].children[1];
        main_body.children.insert(
            0,
            while_(
                cmp("<", ident("x"), num(10)),
                block(vec![
                    if_(
                        and(ident("x"), cmp(">", ident("g"), num(0))),
                        block(vec![
                            assign(index("arr", num(1)), ident("x")),
                            call("putint", vec![ident("x")]),
                        ]),
                        Some(if_(ident("g"), ret(Some(num(1))), None)),
                    ),
                    arith(b'+', ident("x"), num(1)),
                    assign(ident("x"), arith(b'+', ident("x"), num(1))),
                    empty(),
                ]),
            ),
        );

        let code = generate(&root, true);
        assert_ok_eq!(stack_depth(&code.codes), 0);
    }

    #[test]
    fn labels_are_unique() {
        let root = expression_program(sample_expressions());
        let asm = assembly(&root);

        let labels: Vec<&str> = asm
            .lines()
            .filter(|line| !line.starts_with(' ') && line.ends_with(':'))
            .collect();
        let distinct: HashSet<&&str> = labels.iter().collect();
        assert_eq!(labels.len(), distinct.len());
        assert!(labels.contains(&".and_false_2:"));
    }

    #[test]
    fn global_array_store_and_load() {
        // int t[3]; int main(void) { t[1] = 5; return t[1]; }
        let root = program(
            vec![vars("int", vec![array("t", 3)])],
            vec![main_with(
                vec![],
                vec![
                    assign(index("t", num(1)), num(5)),
                    ret(Some(index("t", num(1)))),
                ],
            )],
        );
        let asm = assembly(&root);

        assert!(asm.contains("global_vars: resb 24\n"));
        assert_eq!(
            body_of(&asm, "main"),
            indoc! {"
                main:
                    push rbp
                    mov rbp, rsp
                    push 5
                    push 1
                    pop rax
                    lea rdx, [global_vars]
                    lea rax, [rdx + rax * 8]
                    push rax
                    pop rax
                    pop QWORD [rax]
                    push 1
                    pop rax
                    lea rdx, [global_vars]
                    lea rax, [rdx + rax * 8]
                    push rax
                    pop rax
                    push QWORD [rax]
                    pop rax
                    mov rsp, rbp
                    pop rbp
                    ret
            "}
        );
    }

    #[test]
    fn array_parameter_is_a_pointer() {
        let root = expression_program(vec![]);
        let asm = assembly(&root);

        assert!(asm.contains(&code_lines(indoc! {"
            pick:
                push rbp
                mov rbp, rsp
                sub rsp, 16
                mov QWORD [rbp - 8], rdi
                mov QWORD [rbp - 16], rsi
                push QWORD [rbp - 16]
                pop rax
                mov rdx, QWORD [rbp - 8]
                lea rax, [rdx + rax * 8]
                push rax
                pop rax
                push QWORD [rax]
                pop rax
                mov rsp, rbp
                pop rbp
                ret
        "})));
    }

    #[test]
    fn local_array_decays_to_its_frame_address() {
        let root = expression_program(vec![call("pick", vec![ident("arr"), num(0)])]);
        let asm = assembly(&root);

        assert!(asm.contains(&code_lines(indoc! {"
                push 0
                lea rdx, [rbp - 24]
                push rdx
                pop rdi
                pop rsi
                call pick
                push rax
                pop rax
                mov QWORD [rbp - 8], rax
        "})));
    }

    #[test]
    fn division_and_remainder() {
        let root = program(
            vec![],
            vec![main_with(
                vec![],
                vec![ret(Some(arith(b'%', num(7), arith(b'/', num(9), num(2)))))],
            )],
        );
        let asm = assembly(&root);

        assert!(asm.contains(&code_lines(indoc! {"
                push 7
                push 9
                push 2
                pop rcx
                pop rax
                cqo
                idiv rcx
                push rax
                pop rcx
                pop rax
                cqo
                idiv rcx
                push rdx
                pop rax
        "})));
    }

    #[test]
    fn comparison_and_short_circuit() {
        let root = program(
            vec![vars("int", vec![ident("a"), ident("b")])],
            vec![main_with(
                vec![],
                vec![ret(Some(and(cmp("<", ident("a"), ident("b")), not(ident("a")))))],
            )],
        );
        let asm = assembly(&root);

        assert!(asm.contains(&code_lines(indoc! {"
                push QWORD [global_vars]
                push QWORD [global_vars + 8]
                pop rcx
                pop rax
                cmp rax, rcx
                jl .cmp_true_1
                push 0
                jmp .cmp_end_1
            .cmp_true_1:
                push 1
            .cmp_end_1:
                pop rax
                cmp rax, 0
                je .and_false_0
                push QWORD [global_vars]
                pop rax
                cmp rax, 0
                sete al
                movzx rax, al
                push rax
                pop rax
                cmp rax, 0
                je .and_false_0
                push 1
                jmp .and_end_0
            .and_false_0:
                push 0
            .and_end_0:
                pop rax
        "})));
    }

    #[test]
    fn if_else_and_while() {
        let root = program(
            vec![vars("int", vec![ident("n")])],
            vec![main_with(
                vec![],
                vec![
                    while_(
                        ident("n"),
                        if_(
                            ident("n"),
                            assign(ident("n"), num(0)),
                            Some(assign(ident("n"), num(1))),
                        ),
                    ),
                    ret(Some(num(0))),
                ],
            )],
        );
        let asm = assembly(&root);

        assert!(asm.contains(&code_lines(indoc! {"
            .while_start_0:
                push QWORD [global_vars]
                pop rax
                cmp rax, 0
                je .while_end_0
                push QWORD [global_vars]
                pop rax
                cmp rax, 0
                je .if_else_1
                push 0
                pop rax
                mov QWORD [global_vars], rax
                jmp .if_end_1
            .if_else_1:
                push 1
                pop rax
                mov QWORD [global_vars], rax
            .if_end_1:
                jmp .while_start_0
            .while_end_0:
        "})));
    }

    #[test]
    fn arguments_past_the_sixth_go_on_the_stack() {
        let params: Vec<Node> = ["a", "b", "c", "d", "e", "f", "g", "h"]
            .iter()
            .map(|name| param("int", name))
            .collect();
        let args: Vec<Node> = (1..=8).map(num).collect();
        let root = program(
            vec![],
            vec![
                function(Some("int"), "many", params, vec![], vec![ret(Some(ident("h")))]),
                main_with(vec![], vec![ret(Some(call("many", args)))]),
            ],
        );
        let code = generate(&root, false);
        let asm = code.to_string();

        assert!(asm.contains(&code_lines(indoc! {"
            many:
                push rbp
                mov rbp, rsp
                sub rsp, 48
                mov QWORD [rbp - 8], rdi
                mov QWORD [rbp - 16], rsi
                mov QWORD [rbp - 24], rdx
                mov QWORD [rbp - 32], rcx
                mov QWORD [rbp - 40], r8
                mov QWORD [rbp - 48], r9
                push QWORD [rbp + 24]
                pop rax
        "})));
        assert!(asm.contains(&code_lines(indoc! {"
                push 8
                push 7
                push 6
                push 5
                push 4
                push 3
                push 2
                push 1
                pop rdi
                pop rsi
                pop rdx
                pop rcx
                pop r8
                pop r9
                call many
                add rsp, 16
                push rax
                pop rax
        "})));
        assert_ok_eq!(stack_depth(&code.codes), 0);
    }

    #[test]
    fn unused_values_are_dropped() {
        let root = program(
            vec![],
            vec![main_with(
                vec![],
                vec![
                    arith(b'+', num(1), num(2)),
                    call("getint", vec![]),
                    ret(Some(num(0))),
                ],
            )],
        );
        let asm = assembly(&root);

        assert!(asm.contains(&code_lines(indoc! {"
                add rax, rcx
                push rax
                add rsp, 8
                call getint
                push 0
        "})));
    }

    #[test]
    fn main_without_return_exits_with_zero() {
        let root = program(vec![], vec![main_with(vec![], vec![call("putint", vec![num(3)])])]);
        let asm = assembly(&root);

        assert!(asm.ends_with(&code_lines(indoc! {"
                push 3
                pop rdi
                call putint
                mov rax, 0
                mov rsp, rbp
                pop rbp
                ret
        "})));
    }

    #[test]
    fn comments_only_when_asked() {
        let root = expression_program(vec![num(1)]);

        let quiet = generate(&root, false).to_string();
        assert!(!quiet.contains(';'));

        let chatty = generate(&root, true).to_string();
        assert!(chatty.contains("    ; assign x\n"));
        assert!(chatty.contains("    ; int main, frame of 24 bytes\n"));
    }
}
