pub mod tree;

mod codegen_test;
