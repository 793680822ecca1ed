//! GP node vocabulary: value types, runtime values and the node library.
//!
//! Structural matching never inspects runtime values. Every node kind
//! declares the [`ValueType`] it produces and the types its child slots
//! require; two nodes are interchangeable iff their produced types are equal.

use crate::core::{Configurable, Descriptor, OptionValue, Options, Solution};
use std::fmt;

/// Type tag of a value flowing along a graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueType {
    Boolean,
    Number,
    Solution,
    Solutions,
}

/// A value produced by executing a node.
///
/// A solution without genes stands for "no solution"; downstream nodes pass
/// it through and evaluators score it with the unevaluable sentinel.
pub enum GpValue<ST, PT> {
    Boolean(bool),
    Number(f64),
    Solution(Solution<ST, PT>),
    Solutions(Vec<Solution<ST, PT>>),
}

impl<ST, PT> Clone for GpValue<ST, PT> {
    fn clone(&self) -> Self {
        match self {
            GpValue::Boolean(v) => GpValue::Boolean(*v),
            GpValue::Number(v) => GpValue::Number(*v),
            GpValue::Solution(s) => GpValue::Solution(s.clone()),
            GpValue::Solutions(s) => GpValue::Solutions(s.clone()),
        }
    }
}

impl<ST, PT> fmt::Debug for GpValue<ST, PT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpValue::Boolean(v) => write!(f, "Boolean({v})"),
            GpValue::Number(v) => write!(f, "Number({v})"),
            GpValue::Solution(s) => {
                write!(f, "Solution(genes: {}, quality: {})", s.len(), s.quality())
            }
            GpValue::Solutions(s) => write!(f, "Solutions(len: {})", s.len()),
        }
    }
}

impl<ST, PT> GpValue<ST, PT> {
    /// The neutral value of a type, returned where a node cannot produce one.
    pub fn sample(value_type: ValueType) -> Self {
        match value_type {
            ValueType::Boolean => GpValue::Boolean(false),
            ValueType::Number => GpValue::Number(0.0),
            ValueType::Solution => GpValue::Solution(Solution::new()),
            ValueType::Solutions => GpValue::Solutions(Vec::new()),
        }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            GpValue::Boolean(_) => ValueType::Boolean,
            GpValue::Number(_) => ValueType::Number,
            GpValue::Solution(_) => ValueType::Solution,
            GpValue::Solutions(_) => ValueType::Solutions,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            GpValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            GpValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution<ST, PT>> {
        match self {
            GpValue::Solution(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_solutions(self) -> Option<Vec<Solution<ST, PT>>> {
        match self {
            GpValue::Solutions(s) => Some(s),
            _ => None,
        }
    }
}

/// Default iteration cap of the loop nodes.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// The closed node library.
///
/// Kinds without child slots are terminals; all others are functionals.
/// Loop kinds poll the owning graph's interrupt flag once per iteration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeKind {
    /// Constant number; the `value` option sets it.
    Number(f64),
    /// Constant whole number. Feeds number slots and stays integral under
    /// value mutation; the `value` option takes integers only.
    Integer(i64),
    /// Constant boolean; the `value` option sets it.
    Boolean(bool),
    /// Creates and evaluates a solution of the problem being solved.
    CreateSolution,

    Add,
    Subtract,
    Multiply,
    /// Protected division: a zero divisor yields 0.
    Divide,
    /// Uniform number between its two children (in either order).
    Random,
    LessThan,
    Equals,
    And,
    Or,
    Not,

    /// `[condition, then, else]`.
    IfThenElse(ValueType),
    /// `[count, body]`: runs the body `count` times and yields the last value.
    For { of: ValueType, max_iterations: usize },
    /// `[condition, body]`: runs the body while the condition holds.
    While { of: ValueType, max_iterations: usize },
    /// `[count, solution]`: collects `count` executions of the body.
    Repeat { max_iterations: usize },

    /// Concatenates two solution lists.
    Merge,
    /// Length of a solution list.
    Size,
    /// `[count, solutions]`: the `count` best solutions.
    Elite,
    /// Best solution of a list.
    BestOf,
    /// Applies the configured mutator.
    Mutate,
    /// Breeds a child from a list with the configured crossover.
    Crossover,
    /// Quality of a solution under the configured evaluator.
    Quality,

    /// Graph root; holds the single child producing the final solution.
    Result,
}

impl NodeKind {
    pub fn for_loop(of: ValueType) -> Self {
        NodeKind::For {
            of,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn while_loop(of: ValueType) -> Self {
        NodeKind::While {
            of,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn repeat() -> Self {
        NodeKind::Repeat {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    /// Type of the value this node produces.
    pub fn produces(&self) -> ValueType {
        use NodeKind::*;
        match self {
            Number(_) | Integer(_) | Add | Subtract | Multiply | Divide | Random | Size
            | Quality => ValueType::Number,
            Boolean(_) | LessThan | Equals | And | Or | Not => ValueType::Boolean,
            CreateSolution | BestOf | Mutate | Crossover | Result => ValueType::Solution,
            Repeat { .. } | Merge | Elite => ValueType::Solutions,
            IfThenElse(of) | For { of, .. } | While { of, .. } => *of,
        }
    }

    /// Required type of every child slot, in order.
    pub fn child_types(&self) -> Vec<ValueType> {
        use NodeKind::*;
        use ValueType as T;
        match self {
            Number(_) | Integer(_) | Boolean(_) | CreateSolution => vec![],
            Add | Subtract | Multiply | Divide | Random | LessThan | Equals => {
                vec![T::Number, T::Number]
            }
            And | Or => vec![T::Boolean, T::Boolean],
            Not => vec![T::Boolean],
            IfThenElse(of) => vec![T::Boolean, *of, *of],
            For { of, .. } => vec![T::Number, *of],
            While { of, .. } => vec![T::Boolean, *of],
            Repeat { .. } => vec![T::Number, T::Solution],
            Merge => vec![T::Solutions, T::Solutions],
            Size | BestOf | Crossover => vec![T::Solutions],
            Elite => vec![T::Number, T::Solutions],
            Mutate | Quality | Result => vec![T::Solution],
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            NodeKind::Number(_)
                | NodeKind::Integer(_)
                | NodeKind::Boolean(_)
                | NodeKind::CreateSolution
        )
    }

    /// Whether execution may loop under the control of a child value.
    pub fn is_interruptible(&self) -> bool {
        matches!(
            self,
            NodeKind::For { .. } | NodeKind::While { .. } | NodeKind::Repeat { .. }
        )
    }

    /// Blueprint name, used to key node settings and node costs.
    pub fn name(&self) -> &'static str {
        use NodeKind::*;
        match self {
            Number(_) => "Number",
            Integer(_) => "Integer",
            Boolean(_) => "Boolean",
            CreateSolution => "CreateSolution",
            Add => "Add",
            Subtract => "Subtract",
            Multiply => "Multiply",
            Divide => "Divide",
            Random => "Random",
            LessThan => "LessThan",
            Equals => "Equals",
            And => "And",
            Or => "Or",
            Not => "Not",
            IfThenElse(_) => "IfThenElse",
            For { .. } => "For",
            While { .. } => "While",
            Repeat { .. } => "Repeat",
            Merge => "Merge",
            Size => "Size",
            Elite => "Elite",
            BestOf => "BestOf",
            Mutate => "Mutate",
            Crossover => "Crossover",
            Quality => "Quality",
            Result => "Result",
        }
    }

    /// Value of a numeric constant; `None` for other kinds.
    pub fn constant_number(&self) -> Option<f64> {
        match self {
            NodeKind::Number(v) => Some(*v),
            NodeKind::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Pure arithmetic over two numbers; `None` for other kinds.
    pub fn arithmetic(&self, a: f64, b: f64) -> Option<f64> {
        match self {
            NodeKind::Add => Some(a + b),
            NodeKind::Subtract => Some(a - b),
            NodeKind::Multiply => Some(a * b),
            NodeKind::Divide => Some(if b == 0.0 { 0.0 } else { a / b }),
            _ => None,
        }
    }

    /// Pure comparison of two numbers; `None` for other kinds.
    pub fn comparison(&self, a: f64, b: f64) -> Option<bool> {
        match self {
            NodeKind::LessThan => Some(a < b),
            NodeKind::Equals => Some((a - b).abs() < f64::EPSILON),
            _ => None,
        }
    }

    /// Pure logic over two booleans; `None` for other kinds.
    pub fn logic(&self, a: bool, b: bool) -> Option<bool> {
        match self {
            NodeKind::And => Some(a && b),
            NodeKind::Or => Some(a || b),
            _ => None,
        }
    }
}

impl Configurable for NodeKind {
    fn options(&self) -> Options {
        let mut options = Options::new();
        match self {
            NodeKind::Number(v) => {
                options.insert("value".into(), Descriptor::fixed(*v));
            }
            NodeKind::Integer(v) => {
                options.insert("value".into(), Descriptor::fixed(*v));
            }
            NodeKind::Boolean(v) => {
                options.insert("value".into(), Descriptor::fixed(*v));
            }
            NodeKind::For { max_iterations, .. }
            | NodeKind::While { max_iterations, .. }
            | NodeKind::Repeat { max_iterations } => {
                options.insert("max_iterations".into(), Descriptor::fixed(*max_iterations));
            }
            _ => {}
        }
        options
    }

    fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        let Some(value) = descriptor.fixed_value() else {
            return false;
        };
        match (self, name) {
            (NodeKind::Number(v), "value") => value.as_f64().map(|x| *v = x).is_some(),
            (NodeKind::Integer(v), "value") => match value {
                OptionValue::Integer(x) => {
                    *v = *x;
                    true
                }
                _ => false,
            },
            (NodeKind::Boolean(v), "value") => value.as_bool().map(|x| *v = x).is_some(),
            (
                NodeKind::For { max_iterations, .. }
                | NodeKind::While { max_iterations, .. }
                | NodeKind::Repeat { max_iterations },
                "max_iterations",
            ) => value.as_usize().map(|x| *max_iterations = x).is_some(),
            _ => false,
        }
    }
}

/// Identity of a node inside one graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// One graph node: its kind, ordered child references and cache state.
pub struct GpNode<ST, PT> {
    pub(crate) kind: NodeKind,
    pub(crate) children: Vec<NodeId>,
    pub(crate) cached: bool,
    pub(crate) memo: Option<GpValue<ST, PT>>,
}

impl<ST, PT> Clone for GpNode<ST, PT> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            children: self.children.clone(),
            cached: self.cached,
            memo: self.memo.clone(),
        }
    }
}

impl<ST, PT> fmt::Debug for GpNode<ST, PT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GpNode")
            .field("kind", &self.kind)
            .field("children", &self.children)
            .field("cached", &self.cached)
            .finish()
    }
}

impl<ST, PT> GpNode<ST, PT> {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            cached: false,
            memo: None,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut NodeKind {
        &mut self.kind
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_cached(&self) -> bool {
        self.cached
    }

    /// Enables memoization; disabling also drops the memoized value.
    pub fn set_cached(&mut self, cached: bool) {
        self.cached = cached;
        if !cached {
            self.memo = None;
        }
    }

    pub fn has_memo(&self) -> bool {
        self.memo.is_some()
    }
}

impl<ST, PT> Configurable for GpNode<ST, PT> {
    fn options(&self) -> Options {
        let mut options = self.kind.options();
        if self.kind != NodeKind::Result {
            options.insert("cached".into(), Descriptor::fixed(self.cached));
        }
        options
    }

    fn set_option(&mut self, name: &str, descriptor: &Descriptor) -> bool {
        if name == "cached" && self.kind != NodeKind::Result {
            return match descriptor.fixed_value().and_then(|v| v.as_bool()) {
                Some(cached) => {
                    self.set_cached(cached);
                    true
                }
                None => false,
            };
        }
        self.kind.set_option(name, descriptor)
    }
}
