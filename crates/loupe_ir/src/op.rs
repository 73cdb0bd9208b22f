//! Expression operators and their coverage categories.
//!
//! [`ExprOp`] is the full operator set the external builder produces.
//! [`OpCategory`] is the closed classification the coverage engines switch
//! on; [`ExprOp::category`] is the only place an operator is mapped to one.

use serde::{Deserialize, Serialize};

/// How an operator participates in combinational coverage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OpCategory {
    /// Binary AND-like gates: false unless both inputs are true.
    And,
    /// Binary OR-like gates: true unless both inputs are false.
    Or,
    /// Other binary operators scored on the full joint truth table of their inputs.
    Comparable,
    /// Signals, parameters, unary operators and value-producing operators
    /// scored on the truth of their own result.
    Unary,
    /// Edge and level event triggers.
    Event,
    /// Constants.
    Static,
    /// Delays, case labels, assignments, block markers and other control
    /// constructs that never count toward combinational coverage.
    Control,
}

impl OpCategory {
    /// Returns `true` for the and/or families that may form chains.
    pub fn is_gate(self) -> bool {
        matches!(self, OpCategory::And | OpCategory::Or)
    }

    /// Returns `true` unless the category is static or control.
    pub fn is_measurable(self) -> bool {
        !matches!(self, OpCategory::Static | OpCategory::Control)
    }
}

/// An expression operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExprOp {
    /// Constant value.
    Static,
    /// Signal reference.
    Signal,
    /// Parameter reference.
    Param,
    /// Single-bit select (`a[i]`).
    BitSelect,
    /// Multi-bit select (`a[h:l]`).
    PartSelect,
    /// Concatenation (`{a, b}`).
    Concat,
    /// Replication (`{n{a}}`).
    Expand,
    /// Function call.
    FuncCall,
    /// Bitwise inversion (`~a`).
    Inv,
    /// Logical NOT (`!a`).
    Not,
    /// Reduction AND (`&a`).
    RedAnd,
    /// Reduction OR (`|a`).
    RedOr,
    /// Reduction XOR (`^a`).
    RedXor,
    /// Reduction NAND (`~&a`).
    RedNand,
    /// Reduction NOR (`~|a`).
    RedNor,
    /// Reduction XNOR (`~^a`).
    RedXnor,
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Modulus.
    Mod,
    /// Left shift.
    Shl,
    /// Right shift.
    Shr,
    /// Conditional (`c ? a : b`).
    Cond,
    /// Bitwise AND (`&`).
    And,
    /// Logical AND (`&&`).
    LogicAnd,
    /// Bitwise OR (`|`).
    Or,
    /// Logical OR (`||`).
    LogicOr,
    /// Bitwise XOR (`^`).
    Xor,
    /// Bitwise XNOR (`~^`).
    Xnor,
    /// Bitwise NAND (`~&`).
    Nand,
    /// Bitwise NOR (`~|`).
    Nor,
    /// Equality (`==`).
    Eq,
    /// Inequality (`!=`).
    Ne,
    /// Case equality (`===`).
    CaseEq,
    /// Case inequality (`!==`).
    CaseNe,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Rising-edge event (`posedge a`).
    PosEdge,
    /// Falling-edge event (`negedge a`).
    NegEdge,
    /// Any-change event (`@(a)`).
    AnyEdge,
    /// Event list (`a or b` inside `@(...)`).
    EventOr,
    /// Delay (`#n`).
    Delay,
    /// Second operand of a conditional holding both branches.
    CondSel,
    /// `case` label.
    Case,
    /// `casex` label.
    Casex,
    /// `casez` label.
    Casez,
    /// `default` case label.
    Default,
    /// Continuous assignment (`assign`).
    Assign,
    /// Declaration assignment.
    DeclAssign,
    /// Blocking assignment (`=`).
    BlockingAssign,
    /// Non-blocking assignment (`<=`).
    NonBlockingAssign,
    /// `if` condition marker.
    If,
    /// `while` loop condition marker.
    While,
    /// `repeat` count marker.
    Repeat,
    /// Named event trigger (`-> ev`).
    Trigger,
    /// Task call.
    TaskCall,
    /// `fork` block marker.
    Fork,
    /// `join` block marker.
    Join,
    /// `disable` statement.
    Disable,
    /// Empty statement.
    Noop,
}

impl ExprOp {
    /// Returns the coverage category of this operator.
    pub fn category(self) -> OpCategory {
        use ExprOp::*;
        match self {
            And | LogicAnd => OpCategory::And,
            Or | LogicOr => OpCategory::Or,
            Xor | Xnor | Nand | Nor | Eq | Ne | CaseEq | CaseNe | Lt | Le | Gt | Ge => {
                OpCategory::Comparable
            }
            Signal | Param | BitSelect | PartSelect | Concat | Expand | FuncCall | Inv | Not
            | RedAnd | RedOr | RedXor | RedNand | RedNor | RedXnor | Add | Sub | Mul | Div
            | Mod | Shl | Shr | Cond => OpCategory::Unary,
            PosEdge | NegEdge | AnyEdge | EventOr => OpCategory::Event,
            Static => OpCategory::Static,
            Delay | CondSel | Case | Casex | Casez | Default | Assign | DeclAssign
            | BlockingAssign | NonBlockingAssign | If | While | Repeat | Trigger | TaskCall
            | Fork | Join | Disable | Noop => OpCategory::Control,
        }
    }

    /// Returns `true` if the operator produces a value the simulator tracks
    /// but coverage never measures.
    pub fn is_control(self) -> bool {
        self.category() == OpCategory::Control
    }

    /// Returns `true` if `self` and `other` belong to the same and/or family.
    ///
    /// Bitwise and logical variants of the same gate share a family, so
    /// `a & b && c` forms a single chain.
    pub fn same_family(self, other: ExprOp) -> bool {
        let cat = self.category();
        cat.is_gate() && cat == other.category()
    }
}
