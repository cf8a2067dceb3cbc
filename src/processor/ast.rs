//! Statement-level syntax tree for one Go source file.
//!
//! Only the shape the extractor needs is kept: function declarations,
//! blocks and `if` chains. Every other statement is an opaque `Other`.

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    /// In declaration order.
    pub functions: Vec<FuncDecl>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub name: String,
    /// `None` for a declaration without body (implemented elsewhere).
    pub body: Option<Block>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub stmts: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    If(IfStmt),
    /// A bare `{ … }` block.
    Block(Block),
    Other,
}

/// `if <condition> { … } [else { … } | else if …]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    /// Header text between `if` and `{`, including any init statement.
    pub condition: String,
    pub then: Block,
    pub otherwise: Option<Else>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Else {
    Block(Block),
    If(Box<IfStmt>),
}
