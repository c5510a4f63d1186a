pub mod builder;
pub mod builtins;

use std::fmt::{Display, Formatter};

// every `char` and `int` slot occupies one machine word
pub const WORD_SIZE: usize = 8;

// parameters past this many are passed on the caller's stack
pub const REGISTER_PARAMS: usize = 6;

// [rbp] holds the caller's rbp and [rbp + 8] the return address
pub const FIRST_STACK_PARAM_OFFSET: i32 = 16;

#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Type {
    Byte,
    Num,
    Void,
}

impl Type {
    pub fn from_key_word(word: &str) -> Self {
        match word {
            "char" => Type::Byte,
            "int" => Type::Num,
            "void" => Type::Void,
            other => unreachable!("unknown type keyword '{}'", other),
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Type::Byte | Type::Num => WORD_SIZE,
            Type::Void => 0,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Byte => write!(f, "char"),
            Type::Num => write!(f, "int"),
            Type::Void => write!(f, "void"),
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum ScopeKind {
    Global,
    Param,
    Local,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Location {
    // byte offset into the global data block
    Static(usize),
    // rbp-relative slot of a local variable
    Frame(i32),
    // one of the first six parameters: arrives in the slot-th argument
    // register and is copied to rbp + offset by the prologue
    Register { slot: usize, offset: i32 },
    // seventh parameter onwards, pushed by the caller at rbp + offset
    Stack(i32),
}

impl Location {
    pub fn is_param(&self) -> bool {
        matches!(self, Location::Register { .. } | Location::Stack(_))
    }

    // rbp-relative offset of anything living in the frame
    pub fn frame_offset(&self) -> Option<i32> {
        match *self {
            Location::Static(_) => None,
            Location::Frame(offset) | Location::Register { offset, .. } | Location::Stack(offset) => {
                Some(offset)
            }
        }
    }

    // lowest byte of the storage, in the address space of its scope
    pub fn address(&self) -> i64 {
        match *self {
            Location::Static(addr) => addr as i64,
            Location::Frame(offset) | Location::Register { offset, .. } | Location::Stack(offset) => {
                offset as i64
            }
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::Static(addr) => write!(f, "static {}", addr),
            Location::Frame(offset) => write!(f, "rbp {:+}", offset),
            Location::Register { slot, offset } => write!(f, "arg{} -> rbp {:+}", slot, offset),
            Location::Stack(offset) => write!(f, "stack rbp {:+}", offset),
        }
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Declared {
    pub ident: String,
    pub ty: Type,
    pub line: usize,
    pub column: usize,
    // insertion order within the owning scope
    pub index: usize,
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum SymbolKind {
    Value,
    Array,
    Function,
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Symbol {
    Value {
        decl: Declared,
        location: Location,
    },
    // `length` is None for array parameters, which decay to a pointer
    Array {
        decl: Declared,
        location: Location,
        length: Option<usize>,
    },
    Function {
        decl: Declared,
    },
}

impl Symbol {
    pub fn decl(&self) -> &Declared {
        match self {
            Symbol::Value { decl, .. } | Symbol::Array { decl, .. } | Symbol::Function { decl } => decl,
        }
    }

    pub fn ident(&self) -> &str {
        &self.decl().ident
    }

    pub fn ty(&self) -> Type {
        self.decl().ty
    }

    pub fn index(&self) -> usize {
        self.decl().index
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Value { .. } => SymbolKind::Value,
            Symbol::Array { .. } => SymbolKind::Array,
            Symbol::Function { .. } => SymbolKind::Function,
        }
    }

    pub fn location(&self) -> Option<Location> {
        match self {
            Symbol::Value { location, .. } | Symbol::Array { location, .. } => Some(*location),
            Symbol::Function { .. } => None,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Symbol::Value { .. } => WORD_SIZE,
            Symbol::Array { length: Some(length), .. } => length * WORD_SIZE,
            Symbol::Array { length: None, .. } => WORD_SIZE,
            Symbol::Function { .. } => 0,
        }
    }

    pub fn is_param(&self) -> bool {
        self.location().map_or(false, |l| l.is_param())
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let shape = match self {
            Symbol::Value { .. } => String::from("value"),
            Symbol::Array { length: Some(n), .. } => format!("array[{}]", n),
            Symbol::Array { length: None, .. } => String::from("array[]"),
            Symbol::Function { .. } => String::from("function"),
        };
        write!(
            f,
            "#{:<3} {:<16} {:<5} {:<10} size {:<4}",
            self.index(),
            self.ident(),
            self.ty().to_string(),
            shape,
            self.size()
        )?;
        if let Some(location) = self.location() {
            write!(f, " {}", location)?;
        }
        Ok(())
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Shape {
    Value,
    Array(Option<usize>),
    Function,
}

/// A symbol waiting for its scope to give it an address.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Declaration {
    pub ident: String,
    pub ty: Type,
    pub line: usize,
    pub column: usize,
    pub shape: Shape,
}

impl Declaration {
    pub fn new(ident: &str, ty: Type, shape: Shape, line: usize, column: usize) -> Self {
        Self {
            ident: ident.to_string(),
            ty,
            line,
            column,
            shape,
        }
    }

    pub fn size(&self) -> usize {
        match self.shape {
            Shape::Value | Shape::Array(None) => WORD_SIZE,
            Shape::Array(Some(length)) => length * WORD_SIZE,
            Shape::Function => 0,
        }
    }
}

/// Symbols of one lexical scope, kept sorted by name.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ScopeTable {
    pub kind: ScopeKind,
    symbols: Vec<Symbol>,
    pub next_addr: usize,
    next_stack_param: i32,
}

impl ScopeTable {
    pub fn new(kind: ScopeKind) -> Self {
        Self::starting_at(kind, 0)
    }

    // locals continue past the mirrored parameters
    pub fn starting_at(kind: ScopeKind, next_addr: usize) -> Self {
        Self {
            kind,
            symbols: Vec::new(),
            next_addr,
            next_stack_param: FIRST_STACK_PARAM_OFFSET,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    fn position(&self, ident: &str) -> Result<usize, usize> {
        self.symbols.binary_search_by(|s| s.ident().cmp(ident))
    }

    pub fn get(&self, ident: &str) -> Option<&Symbol> {
        self.position(ident).ok().map(|i| &self.symbols[i])
    }

    pub fn contains(&self, ident: &str) -> bool {
        self.position(ident).is_ok()
    }

    /// Insert and assign storage. A name already present keeps its first
    /// binding and the rejected declaration is handed back.
    pub fn add(&mut self, declaration: Declaration) -> Result<&Symbol, Declaration> {
        let at = match self.position(&declaration.ident) {
            Ok(_) => return Err(declaration),
            Err(at) => at,
        };

        let decl = Declared {
            index: self.symbols.len(),
            ident: declaration.ident.clone(),
            ty: declaration.ty,
            line: declaration.line,
            column: declaration.column,
        };

        let symbol = match declaration.shape {
            Shape::Function => Symbol::Function { decl },
            Shape::Value => Symbol::Value {
                location: self.allocate(declaration.size()),
                decl,
            },
            Shape::Array(length) => Symbol::Array {
                location: self.allocate(declaration.size()),
                decl,
                length,
            },
        };

        self.symbols.insert(at, symbol);
        Ok(&self.symbols[at])
    }

    fn allocate(&mut self, size: usize) -> Location {
        match self.kind {
            ScopeKind::Global => {
                let addr = self.next_addr;
                self.next_addr += size;
                Location::Static(addr)
            }
            ScopeKind::Param if self.symbols.len() < REGISTER_PARAMS => {
                let offset = -((self.next_addr + size) as i32);
                self.next_addr += size;
                Location::Register {
                    slot: self.symbols.len(),
                    offset,
                }
            }
            ScopeKind::Param => {
                let offset = self.next_stack_param;
                self.next_stack_param += size as i32;
                Location::Stack(offset)
            }
            ScopeKind::Local => {
                let offset = -((self.next_addr + size) as i32);
                self.next_addr += size;
                Location::Frame(offset)
            }
        }
    }

    // name order
    pub fn iter(&self) -> std::slice::Iter<'_, Symbol> {
        self.symbols.iter()
    }

    // declaration order
    pub fn in_order(&self) -> Vec<&Symbol> {
        let mut ordered: Vec<&Symbol> = self.symbols.iter().collect();
        ordered.sort_by_key(|s| s.index());
        ordered
    }
}

impl Display for ScopeTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:?} scope, next address {}", self.kind, self.next_addr)?;
        self.symbols.iter().try_for_each(|s| writeln!(f, "    {}", s))
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct FunctionTable {
    pub ident: String,
    pub return_type: Type,
    // position in declaration order, builtins first
    pub index: usize,
    pub params: ScopeTable,
    pub locals: ScopeTable,
    pub builtin: bool,
    pub line: usize,
    pub column: usize,
}

impl FunctionTable {
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn params_in_order(&self) -> Vec<&Symbol> {
        self.params.in_order()
    }

    // bytes reserved below rbp: mirrored register parameters then locals
    pub fn frame_size(&self) -> usize {
        self.locals.next_addr
    }

    pub fn is_declared_before(&self, caller: &FunctionTable) -> bool {
        self.index <= caller.index
    }
}

impl Display for FunctionTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "function #{} {} -> {}", self.index, self.ident, self.return_type)?;
        write!(f, "  {}", self.params)?;
        write!(f, "  {}", self.locals)
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct ProgramTable {
    pub globals: ScopeTable,
    pub functions: Vec<FunctionTable>,
}

impl ProgramTable {
    // first table with this name; later duplicates were already reported
    pub fn function(&self, ident: &str) -> Option<&FunctionTable> {
        self.functions.iter().find(|f| f.ident == ident)
    }

    // one table per `DeclFonct`, in the same order
    pub fn user_functions(&self) -> impl Iterator<Item = &FunctionTable> {
        self.functions.iter().filter(|f| !f.builtin)
    }

    pub fn static_size(&self) -> usize {
        self.globals.next_addr
    }
}

impl Display for ProgramTable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.globals)?;
        self.user_functions().try_for_each(|function| write!(f, "{}", function))
    }
}

/// Name resolution inside one function: locals, then parameters, then globals.
#[derive(Debug, Clone, Copy)]
pub struct ScopeInfo<'a> {
    pub program: &'a ProgramTable,
    pub function: &'a FunctionTable,
}

impl<'a> ScopeInfo<'a> {
    pub fn new(program: &'a ProgramTable, function: &'a FunctionTable) -> Self {
        Self { program, function }
    }

    pub fn resolve(&self, ident: &str) -> Option<&'a Symbol> {
        self.function
            .locals
            .get(ident)
            .or_else(|| self.function.params.get(ident))
            .or_else(|| self.program.globals.get(ident))
    }

    pub fn function_table(&self, ident: &str) -> Option<&'a FunctionTable> {
        self.program.function(ident)
    }
}
