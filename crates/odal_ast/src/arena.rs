//! The type-partitioned AST arena.
//!
//! Every concrete node kind gets its own contiguous slab; a node's handle
//! packs the kind's partition index into the high 8 bits of a `u32` and
//! the slot within the partition into the low 24 bits. Nodes are never
//! individually freed or moved, so a handle, once issued, never changes
//! meaning for the lifetime of the arena.
//!
//! [`AstRef<T>`] tags a handle with the node's static type. A reference
//! to a concrete kind widens losslessly into its family reference
//! ([`StmtRef`] / [`ExprRef`]); going the other way requires consulting
//! the discriminant, via [`AstRef::downcast`] or the borrowed tagged
//! views returned by [`Ast::stmt`] and [`Ast::expr`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Index;

use odal_core::intern::{StringInternTable, StringRef};

use crate::kind::NodeKind;
use crate::node::*;

// ============================================================================
// Handles
// ============================================================================

/// An untyped node handle: 8 bits of partition index, 24 bits of slot.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AstId(u32);

impl AstId {
    const PARTITION_BITS: u32 = 8;
    const SLOT_BITS: u32 = 24;

    /// Maximum number of nodes per partition.
    pub const MAX_SLOTS: u32 = 1 << Self::SLOT_BITS;

    #[inline]
    fn pack(kind: NodeKind, slot: u32) -> AstId {
        debug_assert!(slot < Self::MAX_SLOTS);
        AstId(((kind as u32) << Self::SLOT_BITS) | slot)
    }

    /// The node kind encoded in the partition bits.
    #[inline]
    pub fn kind(self) -> NodeKind {
        NodeKind::from_u8((self.0 >> Self::SLOT_BITS) as u8)
    }

    #[inline]
    fn slot(self) -> usize {
        (self.0 & (Self::MAX_SLOTS - 1)) as usize
    }
}

impl fmt::Debug for AstId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.kind(), self.slot())
    }
}

// The partition index space must cover the closed kind set.
const _: () = assert!(NodeKind::COUNT <= 1 << AstId::PARTITION_BITS);

/// A typed node handle. 4 bytes, `Copy`, comparable.
pub struct AstRef<T> {
    id: AstId,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AstRef<T> {
    #[inline]
    fn from_id(id: AstId) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// The untyped handle.
    #[inline]
    pub fn id(self) -> AstId {
        self.id
    }

    /// The concrete kind of the referenced node.
    #[inline]
    pub fn kind(self) -> NodeKind {
        self.id.kind()
    }
}

impl<T> Copy for AstRef<T> {}

impl<T> Clone for AstRef<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> PartialEq for AstRef<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for AstRef<T> {}

impl<T> Hash for AstRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for AstRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AstRef({:?})", self.id)
    }
}

/// Family marker for statement references. Never instantiated.
pub enum AnyStmt {}

/// Family marker for expression references. Never instantiated.
pub enum AnyExpr {}

/// A reference to any statement node.
pub type StmtRef = AstRef<AnyStmt>;

/// A reference to any expression node.
pub type ExprRef = AstRef<AnyExpr>;

impl StmtRef {
    /// Narrow to a concrete statement kind, checking the discriminant.
    pub fn downcast<T: StmtNode>(self) -> Option<AstRef<T>> {
        (self.kind() == T::KIND).then(|| AstRef::from_id(self.id))
    }
}

impl ExprRef {
    /// Narrow to a concrete expression kind, checking the discriminant.
    pub fn downcast<T: ExprNode>(self) -> Option<AstRef<T>> {
        (self.kind() == T::KIND).then(|| AstRef::from_id(self.id))
    }
}

// ============================================================================
// Node traits
// ============================================================================

/// A concrete node type with its own arena partition.
pub trait AstNode: Sized {
    const KIND: NodeKind;

    #[doc(hidden)]
    fn partition(ast: &Ast) -> &Vec<Self>;
    #[doc(hidden)]
    fn partition_mut(ast: &mut Ast) -> &mut Vec<Self>;
}

/// Marker for nodes in the statement family.
pub trait StmtNode: AstNode {}

/// Marker for nodes in the expression family.
pub trait ExprNode: AstNode {}

// ============================================================================
// The arena
// ============================================================================

macro_rules! ast_partitions {
    (
        statements { $( $sfield:ident : $sty:ident, )* }
        expressions { $( $efield:ident : $ety:ident, )* }
    ) => {
        /// The AST arena: one slab per concrete node kind, plus the string
        /// intern table every node's text lives in. The pair is created,
        /// handed around, and torn down together.
        #[derive(Default)]
        pub struct Ast {
            strings: StringInternTable,
            $( $sfield: Vec<$sty>, )*
            $( $efield: Vec<$ety>, )*
        }

        $(
            impl AstNode for $sty {
                const KIND: NodeKind = NodeKind::$sty;

                fn partition(ast: &Ast) -> &Vec<Self> {
                    &ast.$sfield
                }
                fn partition_mut(ast: &mut Ast) -> &mut Vec<Self> {
                    &mut ast.$sfield
                }
            }

            impl StmtNode for $sty {}

            impl From<AstRef<$sty>> for StmtRef {
                #[inline]
                fn from(r: AstRef<$sty>) -> StmtRef {
                    AstRef::from_id(r.id)
                }
            }
        )*

        $(
            impl AstNode for $ety {
                const KIND: NodeKind = NodeKind::$ety;

                fn partition(ast: &Ast) -> &Vec<Self> {
                    &ast.$efield
                }
                fn partition_mut(ast: &mut Ast) -> &mut Vec<Self> {
                    &mut ast.$efield
                }
            }

            impl ExprNode for $ety {}

            impl From<AstRef<$ety>> for ExprRef {
                #[inline]
                fn from(r: AstRef<$ety>) -> ExprRef {
                    AstRef::from_id(r.id)
                }
            }
        )*
    };
}

ast_partitions! {
    statements {
        empty_stmts: EmptyStmt,
        block_stmts: BlockStmt,
        import_stmts: ImportStmt,
        package_stmts: PackageStmt,
        defer_stmts: DeferStmt,
        break_stmts: BreakStmt,
        continue_stmts: ContinueStmt,
        fallthrough_stmts: FallthroughStmt,
        if_stmts: IfStmt,
        decl_stmts: DeclStmt,
        assign_stmts: AssignStmt,
        expr_stmts: ExprStmt,
    }
    expressions {
        bin_exprs: BinExpr,
        unary_exprs: UnaryExpr,
        ternary_exprs: TernaryExpr,
        ident_exprs: IdentExpr,
        literal_exprs: LiteralExpr,
        undef_exprs: UndefExpr,
        context_exprs: ContextExpr,
        struct_exprs: StructExpr,
        proc_exprs: ProcExpr,
        type_exprs: TypeExpr,
    }
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Construct a node in its kind's partition and return a typed
    /// reference to it. Returns `None` when the partition's 24-bit slot
    /// space is exhausted; the caller treats that as out of memory.
    pub fn create<T: AstNode>(&mut self, node: T) -> Option<AstRef<T>> {
        let partition = T::partition_mut(self);
        let slot = partition.len();
        if slot >= AstId::MAX_SLOTS as usize {
            return None;
        }
        partition.push(node);
        Some(AstRef::from_id(AstId::pack(T::KIND, slot as u32)))
    }

    /// Intern text into the arena's string table.
    pub fn insert(&mut self, text: &str) -> Option<StringRef> {
        self.strings.insert(text)
    }

    /// Resolve interned text.
    #[inline]
    pub fn string(&self, handle: StringRef) -> &str {
        self.strings.resolve(handle)
    }

    /// The string intern table itself.
    pub fn strings(&self) -> &StringInternTable {
        &self.strings
    }

    /// Number of nodes stored in `T`'s partition.
    pub fn count<T: AstNode>(&self) -> usize {
        T::partition(self).len()
    }

    /// Resolve a statement family reference to a borrowed tagged view.
    pub fn stmt(&self, r: StmtRef) -> Stmt<'_> {
        let slot = r.id.slot();
        match r.kind() {
            NodeKind::EmptyStmt => Stmt::Empty(&self.empty_stmts[slot]),
            NodeKind::BlockStmt => Stmt::Block(&self.block_stmts[slot]),
            NodeKind::ImportStmt => Stmt::Import(&self.import_stmts[slot]),
            NodeKind::PackageStmt => Stmt::Package(&self.package_stmts[slot]),
            NodeKind::DeferStmt => Stmt::Defer(&self.defer_stmts[slot]),
            NodeKind::BreakStmt => Stmt::Break(&self.break_stmts[slot]),
            NodeKind::ContinueStmt => Stmt::Continue(&self.continue_stmts[slot]),
            NodeKind::FallthroughStmt => Stmt::Fallthrough(&self.fallthrough_stmts[slot]),
            NodeKind::IfStmt => Stmt::If(&self.if_stmts[slot]),
            NodeKind::DeclStmt => Stmt::Decl(&self.decl_stmts[slot]),
            NodeKind::AssignStmt => Stmt::Assign(&self.assign_stmts[slot]),
            NodeKind::ExprStmt => Stmt::Expr(&self.expr_stmts[slot]),
            // A StmtRef can only be built by widening a statement ref.
            _ => unreachable!("statement reference with expression kind"),
        }
    }

    /// Resolve an expression family reference to a borrowed tagged view.
    pub fn expr(&self, r: ExprRef) -> Expr<'_> {
        let slot = r.id.slot();
        match r.kind() {
            NodeKind::BinExpr => Expr::Bin(&self.bin_exprs[slot]),
            NodeKind::UnaryExpr => Expr::Unary(&self.unary_exprs[slot]),
            NodeKind::TernaryExpr => Expr::Ternary(&self.ternary_exprs[slot]),
            NodeKind::IdentExpr => Expr::Ident(&self.ident_exprs[slot]),
            NodeKind::LiteralExpr => Expr::Literal(&self.literal_exprs[slot]),
            NodeKind::UndefExpr => Expr::Undef(&self.undef_exprs[slot]),
            NodeKind::ContextExpr => Expr::Context(&self.context_exprs[slot]),
            NodeKind::StructExpr => Expr::Struct(&self.struct_exprs[slot]),
            NodeKind::ProcExpr => Expr::Proc(&self.proc_exprs[slot]),
            NodeKind::TypeExpr => Expr::Type(&self.type_exprs[slot]),
            // An ExprRef can only be built by widening an expression ref.
            _ => unreachable!("expression reference with statement kind"),
        }
    }
}

impl<T: AstNode> Index<AstRef<T>> for Ast {
    type Output = T;

    /// O(1) resolution: decode the slot, index the partition. Passing a
    /// reference from a different arena is a programmer error.
    fn index(&self, r: AstRef<T>) -> &T {
        debug_assert_eq!(r.kind(), T::KIND);
        &T::partition(self)[r.id.slot()]
    }
}

/// A borrowed, tag-dispatched view of one statement node.
#[derive(Debug)]
pub enum Stmt<'a> {
    Empty(&'a EmptyStmt),
    Block(&'a BlockStmt),
    Import(&'a ImportStmt),
    Package(&'a PackageStmt),
    Defer(&'a DeferStmt),
    Break(&'a BreakStmt),
    Continue(&'a ContinueStmt),
    Fallthrough(&'a FallthroughStmt),
    If(&'a IfStmt),
    Decl(&'a DeclStmt),
    Assign(&'a AssignStmt),
    Expr(&'a ExprStmt),
}

/// A borrowed, tag-dispatched view of one expression node.
#[derive(Debug)]
pub enum Expr<'a> {
    Bin(&'a BinExpr),
    Unary(&'a UnaryExpr),
    Ternary(&'a TernaryExpr),
    Ident(&'a IdentExpr),
    Literal(&'a LiteralExpr),
    Undef(&'a UndefExpr),
    Context(&'a ContextExpr),
    Struct(&'a StructExpr),
    Proc(&'a ProcExpr),
    Type(&'a TypeExpr),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_index() {
        let mut ast = Ast::new();
        let name = ast.insert("main").unwrap();
        let package = ast.create(PackageStmt { name }).unwrap();
        assert_eq!(package.kind(), NodeKind::PackageStmt);
        assert_eq!(ast.string(ast[package].name), "main");
    }

    #[test]
    fn test_references_stable_across_unrelated_creates() {
        let mut ast = Ast::new();
        let ident = ast.insert("x").unwrap();
        let first = ast.create(IdentExpr { ident }).unwrap();

        // Interleave creates in several other partitions.
        for i in 0..100 {
            let s = ast.insert(&format!("y{i}")).unwrap();
            ast.create(IdentExpr { ident: s }).unwrap();
            ast.create(EmptyStmt).unwrap();
            ast.create(UndefExpr).unwrap();
        }

        assert_eq!(ast.string(ast[first].ident), "x");
    }

    #[test]
    fn test_widening_preserves_identity() {
        let mut ast = Ast::new();
        let cond = ast.insert("ok").unwrap();
        let cond = ast.create(IdentExpr { ident: cond }).unwrap();
        let body = ast.create(BlockStmt { stmts: Vec::new() }).unwrap();
        let if_stmt = ast
            .create(IfStmt {
                init: None,
                cond: cond.into(),
                on_true: body.into(),
                on_false: None,
            })
            .unwrap();

        let widened: StmtRef = if_stmt.into();
        assert_eq!(widened.id(), if_stmt.id());
        assert_eq!(widened.kind(), NodeKind::IfStmt);
        assert!(matches!(ast.stmt(widened), Stmt::If(_)));
    }

    #[test]
    fn test_downcast() {
        let mut ast = Ast::new();
        let stmt: StmtRef = ast.create(FallthroughStmt).unwrap().into();
        assert!(stmt.downcast::<FallthroughStmt>().is_some());
        assert!(stmt.downcast::<EmptyStmt>().is_none());
    }

    #[test]
    fn test_slots_are_per_partition() {
        let mut ast = Ast::new();
        ast.create(EmptyStmt).unwrap();
        ast.create(EmptyStmt).unwrap();
        let fallthrough = ast.create(FallthroughStmt).unwrap();
        // A fresh partition starts at slot zero regardless of traffic in
        // other partitions.
        assert_eq!(fallthrough.id().kind(), NodeKind::FallthroughStmt);
        assert_eq!(ast.count::<FallthroughStmt>(), 1);
        assert_eq!(ast.count::<EmptyStmt>(), 2);
    }

    #[test]
    fn test_partition_exhaustion_reports_failure() {
        let mut ast = Ast::new();
        // EmptyStmt is zero-sized, so filling its 24-bit slot space only
        // bumps a length counter.
        for _ in 0..AstId::MAX_SLOTS {
            assert!(ast.create(EmptyStmt).is_some());
        }
        assert!(ast.create(EmptyStmt).is_none());
        // Other partitions are unaffected.
        assert!(ast.create(FallthroughStmt).is_some());
    }
}
