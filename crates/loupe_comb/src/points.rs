//! Coverage points: the unit both the calculator and the detail extractor
//! work in.
//!
//! Every scored node (or chain) expands to a list of [`CoveragePoint`]s.
//! The calculator counts them, the detail extractor reports the missed ones,
//! so the two can never disagree about what a node's total is.

use crate::classify::{chain_membership, chain_operands, is_subsumed_operand, ChainRole};
use loupe_config::CombConfig;
use loupe_ir::{BitHistory, BitMask, CoverageDb, ExprId, Expression, OpCategory};

/// What a single coverage point asks of the simulation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointKind {
    /// AND gate: the left input alone drove the output false.
    LeftFalse,
    /// AND gate: the right input alone drove the output false.
    RightFalse,
    /// AND gate: both inputs were true together.
    BothTrue,
    /// OR gate: the left input alone drove the output true.
    LeftTrue,
    /// OR gate: the right input alone drove the output true.
    RightTrue,
    /// OR gate: both inputs were false together.
    BothFalse,
    /// Comparison: the inputs were jointly observed at (`left`, `right`).
    Joint {
        /// Value of the left input.
        left: bool,
        /// Value of the right input.
        right: bool,
    },
    /// Event: the event occurred.
    EventFired,
    /// Value: observed true.
    ValueTrue,
    /// Value: observed false.
    ValueFalse,
    /// AND chain: this operand was observed false.
    OperandFalse,
    /// OR chain: this operand was observed true.
    OperandTrue,
    /// AND chain: every operand was true together.
    AllTrue,
    /// OR chain: every operand was false together.
    AllFalse,
}

/// One scored combination for one node (or one bit of it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoveragePoint {
    /// The combination this point stands for.
    pub kind: PointKind,
    /// Observed in simulation.
    pub hit: bool,
    /// Forced to read as hit by an exclusion on the point's node or above it.
    pub excluded: bool,
    /// Bit index when scored bitwise.
    pub bit: Option<u32>,
    /// Node that carries the underline for this point: the chain operand for
    /// operand points, otherwise the scored node itself.
    pub at: ExprId,
}

impl CoveragePoint {
    /// Returns `true` if the point reads as covered.
    pub fn is_covered(&self) -> bool {
        self.hit || self.excluded
    }
}

/// Expands `id` into its coverage points.
///
/// `excluded` is the node's effective exclusion (its own flag or any
/// ancestor's). Returns `None` for nodes whose evidence is scored by
/// someone else: subsumed operands and chain interiors. Measurability,
/// depth and pass marks are the caller's business.
///
/// # Panics
///
/// Panics if a pair operator lacks a child, or if bitwise scoring reaches a
/// multi-bit node or operand without the per-bit history the simulator
/// should have recorded.
pub fn node_points(
    db: &CoverageDb,
    id: ExprId,
    cfg: &CombConfig,
    excluded: bool,
) -> Option<Vec<CoveragePoint>> {
    if is_subsumed_operand(db, id) {
        return None;
    }
    match chain_membership(db, id, cfg) {
        Some(ChainRole::Interior) => None,
        Some(ChainRole::Root) => Some(chain_points(db, id, cfg, excluded)),
        Some(ChainRole::Boundary) | None => Some(single_points(db, id, cfg, excluded)),
    }
}

fn bitwise_width(node: &Expression, cfg: &CombConfig) -> Option<u32> {
    (cfg.bitwise && node.width > 1).then_some(node.width)
}

fn history(db: &CoverageDb, id: ExprId) -> &BitHistory {
    match &db.exprs[id].bits {
        Some(bits) => bits,
        None => panic!("bitwise scoring of {id} requires per-bit history from the simulator"),
    }
}

/// Per-bit view of an operand's `was_true`/`was_false` history, laid out at
/// the width of the node being scored.
///
/// A 1-bit operand (an enable gating a bus) applies its scalar value to every
/// bit. A wider operand is read bit for bit: bits past its own width take its
/// scalar value, bits past `width` are dropped.
fn operand_mask(
    db: &CoverageDb,
    id: ExprId,
    width: u32,
    pick: fn(&BitHistory) -> &BitMask,
    scalar: bool,
) -> BitMask {
    let own_width = db.exprs[id].width;
    let bits = (own_width > 1).then(|| pick(history(db, id)));
    let mut mask = BitMask::zeros(width);
    for bit in 0..width {
        let hit = match bits {
            Some(bits) if bit < own_width => bits.get(bit),
            _ => scalar,
        };
        mask.set(bit, hit);
    }
    mask
}

fn pair(db: &CoverageDb, id: ExprId) -> (ExprId, ExprId) {
    let node = &db.exprs[id];
    match (node.left, node.right) {
        (Some(left), Some(right)) => (left, right),
        _ => panic!("{:?} node {id} is missing an operand", node.op),
    }
}

/// Pushes one point per bit (bitwise) or a single scalar point.
struct Emitter {
    at: ExprId,
    excluded: bool,
    width: Option<u32>,
    out: Vec<CoveragePoint>,
}

impl Emitter {
    fn scalar(&mut self, kind: PointKind, hit: bool) {
        self.out.push(CoveragePoint {
            kind,
            hit,
            excluded: self.excluded,
            bit: None,
            at: self.at,
        });
    }

    /// `mask` is only called when scoring bitwise, with the scored width.
    fn emit(&mut self, kind: PointKind, scalar: bool, mask: impl FnOnce(u32) -> BitMask) {
        match self.width {
            None => self.scalar(kind, scalar),
            Some(width) => {
                let mask = mask(width);
                for bit in 0..width {
                    self.out.push(CoveragePoint {
                        kind,
                        hit: mask.get(bit),
                        excluded: self.excluded,
                        bit: Some(bit),
                        at: self.at,
                    });
                }
            }
        }
    }
}

fn single_points(
    db: &CoverageDb,
    id: ExprId,
    cfg: &CombConfig,
    excluded: bool,
) -> Vec<CoveragePoint> {
    let node = &db.exprs[id];
    let mut em = Emitter {
        at: id,
        excluded,
        width: bitwise_width(node, cfg),
        out: Vec::new(),
    };
    match node.category() {
        OpCategory::And => {
            let (l, r) = pair(db, id);
            for (kind, operand) in [(PointKind::LeftFalse, l), (PointKind::RightFalse, r)] {
                let was_false = db.exprs[operand].was_false;
                em.emit(kind, was_false, |width| {
                    operand_mask(db, operand, width, |h| &h.was_false, was_false)
                });
            }
            em.emit(PointKind::BothTrue, node.eval11, |_| history(db, id).eval11.clone());
        }
        OpCategory::Or => {
            let (l, r) = pair(db, id);
            for (kind, operand) in [(PointKind::LeftTrue, l), (PointKind::RightTrue, r)] {
                let was_true = db.exprs[operand].was_true;
                em.emit(kind, was_true, |width| {
                    operand_mask(db, operand, width, |h| &h.was_true, was_true)
                });
            }
            em.emit(PointKind::BothFalse, node.eval00, |_| history(db, id).eval00.clone());
        }
        OpCategory::Comparable => {
            pair(db, id);
            let joint = |left, right| PointKind::Joint { left, right };
            em.emit(joint(false, false), node.eval00, |_| history(db, id).eval00.clone());
            em.emit(joint(false, true), node.eval01, |_| history(db, id).eval01.clone());
            em.emit(joint(true, false), node.eval10, |_| history(db, id).eval10.clone());
            em.emit(joint(true, true), node.eval11, |_| history(db, id).eval11.clone());
        }
        OpCategory::Event => {
            em.emit(PointKind::EventFired, node.was_true, |_| {
                history(db, id).was_true.clone()
            });
        }
        OpCategory::Unary | OpCategory::Static | OpCategory::Control => {
            em.emit(PointKind::ValueTrue, node.was_true, |_| {
                history(db, id).was_true.clone()
            });
            em.emit(PointKind::ValueFalse, node.was_false, |_| {
                history(db, id).was_false.clone()
            });
        }
    }
    em.out
}

/// Scores the chain rooted at `root`: one point per boundary operand plus
/// one for the whole chain passing (AND) or failing (OR) together.
fn chain_points(
    db: &CoverageDb,
    root: ExprId,
    cfg: &CombConfig,
    excluded: bool,
) -> Vec<CoveragePoint> {
    let root_node = &db.exprs[root];
    let is_and = root_node.category() == OpCategory::And;
    let width = bitwise_width(root_node, cfg);
    let mut out = Vec::new();

    for operand in chain_operands(db, root) {
        let operand_excluded = excluded || excluded_between(db, root, operand);
        let node = &db.exprs[operand];
        let mut em = Emitter {
            at: operand,
            excluded: operand_excluded,
            width,
            out,
        };
        if is_and {
            em.emit(PointKind::OperandFalse, node.was_false, |width| {
                operand_mask(db, operand, width, |h| &h.was_false, node.was_false)
            });
        } else {
            em.emit(PointKind::OperandTrue, node.was_true, |width| {
                operand_mask(db, operand, width, |h| &h.was_true, node.was_true)
            });
        }
        out = em.out;
    }

    let mut em = Emitter {
        at: root,
        excluded,
        width,
        out,
    };
    if is_and {
        em.emit(PointKind::AllTrue, root_node.eval11, |_| history(db, root).eval11.clone());
    } else {
        em.emit(PointKind::AllFalse, root_node.eval00, |_| history(db, root).eval00.clone());
    }
    em.out
}

/// Returns `true` if `operand` or any chain member between it and `root`
/// (exclusive of `root`) is excluded.
fn excluded_between(db: &CoverageDb, root: ExprId, operand: ExprId) -> bool {
    if db.exprs[operand].excluded {
        return true;
    }
    db.ancestors(operand)
        .take_while(|&a| a != root)
        .any(|a| db.exprs[a].excluded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loupe_ir::{ExprOp, TreeBuilder};

    fn count(points: &[CoveragePoint]) -> (usize, usize) {
        let hit = points.iter().filter(|p| p.is_covered()).count();
        (hit, points.len())
    }

    #[test]
    fn and_pair_three_points() {
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let x = b.leaf(ExprOp::Signal, 1, 1);
        let y = b.leaf(ExprOp::Signal, 1, 1);
        let and = b.binary(ExprOp::And, x, y, 1, 1).unwrap();
        b.statement(and).unwrap();
        // Observed (x, y) = (0, 1) and (1, 1).
        db.exprs[x].was_false = true;
        db.exprs[x].was_true = true;
        db.exprs[y].was_true = true;
        db.exprs[and].eval01 = true;
        db.exprs[and].eval11 = true;

        let points = node_points(&db, and, &CombConfig::default(), false).unwrap();
        assert_eq!(count(&points), (2, 3));
        let missed: Vec<_> = points.iter().filter(|p| !p.hit).map(|p| p.kind).collect();
        assert_eq!(missed, vec![PointKind::RightFalse]);
        assert!(node_points(&db, x, &CombConfig::default(), false).is_none());
    }

    #[test]
    fn or_pair_uses_was_true_and_eval00() {
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let x = b.leaf(ExprOp::Signal, 1, 1);
        let y = b.leaf(ExprOp::Signal, 1, 1);
        let or = b.binary(ExprOp::LogicOr, x, y, 1, 1).unwrap();
        b.statement(or).unwrap();
        db.exprs[y].was_true = true;
        db.exprs[or].eval00 = true;
        let points = node_points(&db, or, &CombConfig::default(), false).unwrap();
        assert_eq!(count(&points), (2, 3));
        assert_eq!(points[0].kind, PointKind::LeftTrue);
        assert!(!points[0].hit);
    }

    #[test]
    fn comparison_full_truth_table() {
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let x = b.leaf(ExprOp::Signal, 8, 1);
        let y = b.leaf(ExprOp::Signal, 8, 1);
        let eq = b.binary(ExprOp::Eq, x, y, 1, 1).unwrap();
        b.statement(eq).unwrap();
        db.exprs[eq].eval00 = true;
        db.exprs[eq].eval11 = true;
        let points = node_points(&db, eq, &CombConfig::default(), false).unwrap();
        assert_eq!(count(&points), (2, 4));
    }

    #[test]
    fn excluded_points_read_covered() {
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let ev = b.leaf(ExprOp::PosEdge, 1, 1);
        b.statement(ev).unwrap();
        let points = node_points(&db, ev, &CombConfig::default(), true).unwrap();
        assert_eq!(count(&points), (1, 1));
        assert!(!points[0].hit);
        assert!(points[0].excluded);
    }

    #[test]
    fn chain_points_one_per_operand_plus_root() {
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let a = b.leaf(ExprOp::Signal, 1, 1);
        let bb = b.leaf(ExprOp::Signal, 1, 1);
        let ab = b.binary(ExprOp::And, a, bb, 1, 1).unwrap();
        let c = b.leaf(ExprOp::Signal, 1, 1);
        let root = b.binary(ExprOp::And, ab, c, 1, 1).unwrap();
        b.statement(root).unwrap();
        db.exprs[a].was_false = true;
        db.exprs[root].eval11 = true;
        db.exprs[bb].excluded = true;

        let cfg = CombConfig::default();
        assert!(node_points(&db, ab, &cfg, false).is_none());
        let points = node_points(&db, root, &cfg, false).unwrap();
        let ats: Vec<_> = points.iter().map(|p| p.at).collect();
        assert_eq!(ats, vec![a, bb, c, root]);
        assert_eq!(points[3].kind, PointKind::AllTrue);
        assert!(points[1].excluded);
        assert_eq!(count(&points), (3, 4));
    }

    #[test]
    fn bitwise_multiplies_by_width() {
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let x = b.leaf(ExprOp::Signal, 4, 1);
        let y = b.leaf(ExprOp::Signal, 4, 1);
        let and = b.binary(ExprOp::And, x, y, 4, 1).unwrap();
        b.statement(and).unwrap();
        for id in [x, y, and] {
            db.exprs[id].bits = Some(BitHistory::new(4));
        }
        if let Some(bits) = db.exprs[x].bits.as_mut() {
            bits.was_false = BitMask::ones(4);
        }
        if let Some(bits) = db.exprs[and].bits.as_mut() {
            bits.eval11.set(2, true);
        }
        let cfg = CombConfig {
            bitwise: true,
            ..CombConfig::default()
        };
        let points = node_points(&db, and, &cfg, false).unwrap();
        assert_eq!(count(&points), (5, 12));
        assert_eq!(points[8].bit, Some(0));
    }

    fn bitwise() -> CombConfig {
        CombConfig {
            bitwise: true,
            ..CombConfig::default()
        }
    }

    #[test]
    fn bitwise_scalar_operand_applies_to_every_bit() {
        // bus & en, with a 1-bit enable that has no per-bit history.
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let bus = b.leaf(ExprOp::Signal, 4, 1);
        let en = b.leaf(ExprOp::Signal, 1, 1);
        let and = b.binary(ExprOp::And, bus, en, 4, 1).unwrap();
        b.statement(and).unwrap();
        let mut bus_bits = BitHistory::new(4);
        bus_bits.was_false.set(0, true);
        bus_bits.was_false.set(1, true);
        db.exprs[bus].bits = Some(bus_bits);
        let mut and_bits = BitHistory::new(4);
        and_bits.eval11.set(3, true);
        db.exprs[and].bits = Some(and_bits);

        let points = node_points(&db, and, &bitwise(), false).unwrap();
        assert_eq!(count(&points), (3, 12));
        assert!(points[4..8].iter().all(|p| p.kind == PointKind::RightFalse && !p.hit));

        db.exprs[en].was_false = true;
        let points = node_points(&db, and, &bitwise(), false).unwrap();
        assert_eq!(count(&points), (7, 12));
        assert!(points[4..8].iter().all(|p| p.hit));
    }

    #[test]
    fn bitwise_or_reads_each_operand_at_its_own_width() {
        // A 2-bit operand of a 4-bit OR: its upper bits take its scalar value.
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let x = b.leaf(ExprOp::Signal, 4, 1);
        let y = b.leaf(ExprOp::Signal, 2, 1);
        let or = b.binary(ExprOp::Or, x, y, 4, 1).unwrap();
        b.statement(or).unwrap();
        db.exprs[x].bits = Some(BitHistory::new(4));
        let mut y_bits = BitHistory::new(2);
        y_bits.was_true.set(1, true);
        db.exprs[y].bits = Some(y_bits);
        db.exprs[y].was_true = true;
        db.exprs[or].bits = Some(BitHistory::new(4));

        let points = node_points(&db, or, &bitwise(), false).unwrap();
        let right: Vec<_> = points[4..8].iter().map(|p| p.hit).collect();
        assert_eq!(right, vec![false, true, true, true]);
        assert_eq!(count(&points), (3, 12));
    }

    #[test]
    fn bitwise_chain_uses_operand_widths() {
        // (a & b) & c at 4 bits with a 1-bit b and a 2-bit c.
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let a = b.leaf(ExprOp::Signal, 4, 1);
        let bb = b.leaf(ExprOp::Signal, 1, 1);
        let ab = b.binary(ExprOp::And, a, bb, 4, 1).unwrap();
        let c = b.leaf(ExprOp::Signal, 2, 1);
        let root = b.binary(ExprOp::And, ab, c, 4, 1).unwrap();
        b.statement(root).unwrap();
        let mut a_bits = BitHistory::new(4);
        a_bits.was_false = BitMask::ones(4);
        db.exprs[a].bits = Some(a_bits);
        let mut c_bits = BitHistory::new(2);
        c_bits.was_false.set(1, true);
        db.exprs[c].bits = Some(c_bits);
        db.exprs[c].was_false = true;
        db.exprs[ab].bits = Some(BitHistory::new(4));
        let mut root_bits = BitHistory::new(4);
        root_bits.eval11.set(0, true);
        db.exprs[root].bits = Some(root_bits);

        let points = node_points(&db, root, &bitwise(), false).unwrap();
        assert_eq!(count(&points), (8, 16));
        let ats: Vec<_> = points.iter().step_by(4).map(|p| p.at).collect();
        assert_eq!(ats, vec![a, bb, c, root]);
        assert!(points[4..8].iter().all(|p| !p.hit));
        let c_hits: Vec<_> = points[8..12].iter().map(|p| p.hit).collect();
        assert_eq!(c_hits, vec![false, true, true, true]);
        assert_eq!(points[12].kind, PointKind::AllTrue);
        assert!(points[12].hit);
    }

    #[test]
    #[should_panic(expected = "per-bit history")]
    fn bitwise_operand_without_history_panics() {
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let x = b.leaf(ExprOp::Signal, 4, 1);
        let y = b.leaf(ExprOp::Signal, 4, 1);
        let and = b.binary(ExprOp::And, x, y, 4, 1).unwrap();
        b.statement(and).unwrap();
        db.exprs[and].bits = Some(BitHistory::new(4));
        db.exprs[y].bits = Some(BitHistory::new(4));
        node_points(&db, and, &bitwise(), false);
    }

    #[test]
    #[should_panic(expected = "per-bit history")]
    fn bitwise_without_history_panics() {
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let x = b.leaf(ExprOp::Signal, 4, 1);
        b.statement(x).unwrap();
        let cfg = CombConfig {
            bitwise: true,
            ..CombConfig::default()
        };
        node_points(&db, x, &cfg, false);
    }

    #[test]
    #[should_panic(expected = "missing an operand")]
    fn pair_without_right_child_panics() {
        let mut db = CoverageDb::new();
        let mut b = TreeBuilder::new(&mut db);
        let x = b.leaf(ExprOp::Signal, 1, 1);
        let broken = b.unary(ExprOp::Eq, x, 1, 1).unwrap();
        b.statement(broken).unwrap();
        node_points(&db, broken, &CombConfig::default(), false);
    }
}
