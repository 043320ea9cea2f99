//! Sequential causality assignment.
//!
//! The pass runs in four stages over a scratch copy of the causality flags:
//!
//! 1. **Seed**: every element with a fixed policy gets its causality, in node
//!    insertion order.
//! 2. **Propagate**: junctions and two-ports resolve their remaining bonds
//!    until nothing changes.
//! 3. **Storage**: each storage element still open is tried in its preferred
//!    (integral) causality; if propagation then fails it takes the opposite
//!    one. Propagation re-runs after every choice.
//! 4. **Residual**: bonds still open get effort into their later-inserted
//!    endpoint, again followed by propagation.
//!
//! The flags are written back to the graph only if every stage succeeds and
//! the final assignment passes verification.

use bg_core::{BondId, NodeId};
use bg_elements::{Causality, TwoPortRule};
use tracing::{debug, info, warn};

use crate::error::{GraphError, GraphResult};
use crate::graph::{BondGraph, JunctionKind, NodeKind, Phase};
use crate::validate;

/// Strictness switches for causality assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnalysisOptions {
    /// Fail instead of accepting storage elements in derivative causality.
    pub reject_derivative_causality: bool,
    /// Fail instead of resolving free bonds arbitrarily.
    pub reject_algebraic_loops: bool,
}

impl AnalysisOptions {
    /// Options that accept only fully integral, loop-free assignments.
    pub fn strict() -> Self {
        Self {
            reject_derivative_causality: true,
            reject_algebraic_loops: true,
        }
    }
}

/// One decision taken by the assignment, in the order it was taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentStep {
    /// Hard policy of an element.
    Fixed { node: NodeId, bond: BondId },
    /// Forced by a junction or two-port constraint at `node`.
    Propagated { node: NodeId, bond: BondId },
    /// Integral causality chosen for a storage element.
    Preferred { node: NodeId, bond: BondId },
    /// Storage element forced into derivative causality.
    Derivative { node: NodeId, bond: BondId },
    /// Free bond resolved by the insertion-order rule.
    Arbitrary { bond: BondId },
}

impl AssignmentStep {
    pub fn bond(&self) -> BondId {
        match *self {
            AssignmentStep::Fixed { bond, .. }
            | AssignmentStep::Propagated { bond, .. }
            | AssignmentStep::Preferred { bond, .. }
            | AssignmentStep::Derivative { bond, .. }
            | AssignmentStep::Arbitrary { bond } => bond,
        }
    }
}

/// Outcome of a successful assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CausalityReport {
    pub steps: Vec<AssignmentStep>,
    /// Storage nodes that ended up in derivative causality.
    pub derivative: Vec<NodeId>,
    /// Bonds resolved by the residual pass.
    pub arbitrary: Vec<BondId>,
}

impl CausalityReport {
    /// True when every storage element is in its preferred causality.
    pub fn preferred_causalities_valid(&self) -> bool {
        self.derivative.is_empty()
    }
}

impl BondGraph {
    /// Assign causality to every bond with default options.
    pub fn assign_causalities(&mut self) -> GraphResult<CausalityReport> {
        self.assign_causalities_with(&AnalysisOptions::default())
    }

    /// Assign causality to every bond.
    ///
    /// All-or-nothing: on error no bond flag is modified. Fails with
    /// `CausalityAlreadyAssigned` if a previous run succeeded and
    /// `reset_causalities` has not been called since.
    pub fn assign_causalities_with(
        &mut self,
        opts: &AnalysisOptions,
    ) -> GraphResult<CausalityReport> {
        if self.phase == Phase::Assigned {
            return Err(GraphError::CausalityAlreadyAssigned);
        }
        validate::check_complete(self)?;

        let (flags, report) = {
            let mut scap = Scap::new(self);
            let report = scap.run(opts)?;
            (scap.flags, report)
        };

        for (bond, flag) in self.bonds.iter_mut().zip(flags) {
            bond.effort_in_at_to = flag;
        }
        self.phase = Phase::Assigned;

        info!(
            bonds = self.bonds.len(),
            derivative = report.derivative.len(),
            arbitrary = report.arbitrary.len(),
            "causality assigned"
        );
        Ok(report)
    }
}

/// Working state of one assignment run.
#[derive(Debug, Clone)]
struct Scap<'g> {
    graph: &'g BondGraph,
    /// Scratch `effort_in_at_to` per bond.
    flags: Vec<Option<bool>>,
    steps: Vec<AssignmentStep>,
}

impl<'g> Scap<'g> {
    fn new(graph: &'g BondGraph) -> Self {
        Self {
            graph,
            flags: vec![None; graph.bonds.len()],
            steps: Vec::new(),
        }
    }

    fn run(&mut self, opts: &AnalysisOptions) -> GraphResult<CausalityReport> {
        self.seed()?;
        self.propagate()?;
        self.storage_pass()?;
        let arbitrary = self.residual_pass(opts)?;
        self.verify()?;
        let derivative = self.audit(opts)?;
        Ok(CausalityReport {
            steps: std::mem::take(&mut self.steps),
            derivative,
            arbitrary,
        })
    }

    /// Causality of `bond` seen from `node`.
    fn effort_in_at(&self, bond: BondId, node: NodeId) -> Option<bool> {
        let at_to = self.flags[bond.slot()]?;
        Some(if self.graph.bonds[bond.slot()].to == node {
            at_to
        } else {
            !at_to
        })
    }

    /// Record `effort_in` at `node` on `bond`.
    ///
    /// Returns whether the bond was open. Setting an already resolved bond to
    /// the other direction is a conflict reported against `node`.
    fn set(
        &mut self,
        bond: BondId,
        node: NodeId,
        effort_in: bool,
        step: AssignmentStep,
        reason: &'static str,
    ) -> GraphResult<bool> {
        let b = &self.graph.bonds[bond.slot()];
        let at_to = if b.to == node { effort_in } else { !effort_in };
        match self.flags[bond.slot()] {
            Some(existing) if existing == at_to => Ok(false),
            Some(_) => Err(GraphError::conflict(self.graph.node_name(node), bond, reason)),
            None => {
                debug!(
                    bond = bond.index() + 1,
                    node = self.graph.node_name(node),
                    effort_in,
                    ?step,
                    "causality set"
                );
                self.flags[bond.slot()] = Some(at_to);
                self.steps.push(step);
                Ok(true)
            }
        }
    }

    fn seed(&mut self) -> GraphResult<()> {
        let graph = self.graph;
        for node in &graph.nodes {
            let NodeKind::OnePort(element) = &node.kind else {
                continue;
            };
            let policy = element.causality_policy();
            let (true, Some(effort_in)) = (policy.is_fixed(), policy.effort_in()) else {
                continue;
            };
            for &bond in graph.node_bonds(node.id) {
                self.set(
                    bond,
                    node.id,
                    effort_in,
                    AssignmentStep::Fixed {
                        node: node.id,
                        bond,
                    },
                    "fixed causalities of both bond ends disagree",
                )?;
            }
        }
        Ok(())
    }

    /// Run junction and two-port constraints to a fixed point.
    ///
    /// Every productive round resolves at least one bond, so the loop ends
    /// after at most `bonds + 1` rounds.
    fn propagate(&mut self) -> GraphResult<()> {
        let graph = self.graph;
        for _ in 0..=graph.bonds.len() {
            let mut changed = false;
            for node in &graph.nodes {
                changed |= match &node.kind {
                    NodeKind::Junction(kind) => self.junction_step(node.id, *kind)?,
                    NodeKind::TwoPort(element) => self.two_port_step(node.id, element.rule())?,
                    NodeKind::OnePort(_) => false,
                };
            }
            if !changed {
                break;
            }
        }
        Ok(())
    }

    fn junction_step(&mut self, node: NodeId, kind: JunctionKind) -> GraphResult<bool> {
        let graph = self.graph;
        let det = kind.determining_effort_in();
        let bonds = graph.node_bonds(node);

        let mut determining = bonds
            .iter()
            .copied()
            .filter(|&b| self.effort_in_at(b, node) == Some(det));
        let first = determining.next();
        if let Some(second) = determining.next() {
            return Err(GraphError::conflict(
                self.graph.node_name(node),
                second,
                match kind {
                    JunctionKind::Zero => "more than one bond imposes the common effort",
                    JunctionKind::One => "more than one bond imposes the common flow",
                },
            ));
        }

        let open: Vec<BondId> = bonds
            .iter()
            .copied()
            .filter(|&b| self.flags[b.slot()].is_none())
            .collect();

        let mut changed = false;
        match (first, open.as_slice()) {
            (Some(_), open) => {
                for &bond in open {
                    changed |= self.set(
                        bond,
                        node,
                        !det,
                        AssignmentStep::Propagated { node, bond },
                        "junction already determined",
                    )?;
                }
            }
            (None, [bond]) => {
                changed |= self.set(
                    *bond,
                    node,
                    det,
                    AssignmentStep::Propagated { node, bond: *bond },
                    "junction needs a determining bond",
                )?;
            }
            (None, []) => {
                let last = bonds.last().copied().unwrap_or(BondId::from_index(0));
                return Err(GraphError::conflict(
                    self.graph.node_name(node),
                    last,
                    match kind {
                        JunctionKind::Zero => "no bond imposes the common effort",
                        JunctionKind::One => "no bond imposes the common flow",
                    },
                ));
            }
            (None, _) => {}
        }
        Ok(changed)
    }

    fn two_port_step(&mut self, node: NodeId, rule: TwoPortRule) -> GraphResult<bool> {
        let (Some(port1), Some(port2)) = self.graph.two_port_bonds(node) else {
            return Ok(false);
        };
        let reason = match rule {
            TwoPortRule::Transfer => "transformer ports need opposite causalities",
            TwoPortRule::Swap => "gyrator ports need equal causalities",
        };
        match (self.effort_in_at(port1, node), self.effort_in_at(port2, node)) {
            (Some(c1), None) => self.set(
                port2,
                node,
                rule.other(c1),
                AssignmentStep::Propagated { node, bond: port2 },
                reason,
            ),
            (None, Some(c2)) => self.set(
                port1,
                node,
                rule.other(c2),
                AssignmentStep::Propagated { node, bond: port1 },
                reason,
            ),
            (Some(c1), Some(c2)) if rule.other(c1) != c2 => Err(GraphError::conflict(
                self.graph.node_name(node),
                port2,
                reason,
            )),
            _ => Ok(false),
        }
    }

    /// Next storage element, in node order, whose bond is still open.
    fn next_open_storage(&self) -> Option<(NodeId, BondId, bool)> {
        self.graph.nodes.iter().find_map(|node| {
            let policy = node.causality_policy()?;
            if !policy.is_preferred() {
                return None;
            }
            let preferred = policy.effort_in()?;
            let bond = *self.graph.node_bonds(node.id).first()?;
            self.flags[bond.slot()]
                .is_none()
                .then_some((node.id, bond, preferred))
        })
    }

    fn storage_pass(&mut self) -> GraphResult<()> {
        while let Some((node, bond, preferred)) = self.next_open_storage() {
            let mut trial = self.clone();
            let attempt = trial
                .set(
                    bond,
                    node,
                    preferred,
                    AssignmentStep::Preferred { node, bond },
                    "preferred causality rejected",
                )
                .and_then(|_| trial.propagate());
            match attempt {
                Ok(()) => *self = trial,
                Err(err) => {
                    warn!(
                        node = self.graph.node_name(node),
                        %err,
                        "storage element forced into derivative causality"
                    );
                    self.set(
                        bond,
                        node,
                        !preferred,
                        AssignmentStep::Derivative { node, bond },
                        "derivative causality rejected",
                    )?;
                    self.propagate()?;
                }
            }
        }
        Ok(())
    }

    fn residual_pass(&mut self, opts: &AnalysisOptions) -> GraphResult<Vec<BondId>> {
        let mut arbitrary = Vec::new();
        while let Some(slot) = self.flags.iter().position(Option::is_none) {
            let b = &self.graph.bonds[slot];
            let (bond, from, to) = (b.id, b.from, b.to);
            if opts.reject_algebraic_loops {
                return Err(GraphError::AlgebraicLoop {
                    what: format!(
                        "bond {} between '{}' and '{}' has no forced causality",
                        bond.index() + 1,
                        self.graph.node_name(from),
                        self.graph.node_name(to),
                    ),
                });
            }

            // Effort flows from the earlier-inserted node to the later one.
            let later = from.max(to);
            let mut trial = self.clone();
            let attempt = trial
                .set(
                    bond,
                    later,
                    true,
                    AssignmentStep::Arbitrary { bond },
                    "arbitrary causality rejected",
                )
                .and_then(|_| trial.propagate());
            match attempt {
                Ok(()) => *self = trial,
                Err(_) => {
                    self.set(
                        bond,
                        later,
                        false,
                        AssignmentStep::Arbitrary { bond },
                        "arbitrary causality rejected",
                    )?;
                    self.propagate()?;
                }
            }
            warn!(bond = bond.index() + 1, "bond causality chosen arbitrarily");
            arbitrary.push(bond);
        }
        Ok(arbitrary)
    }

    /// Check the complete assignment against every constraint.
    fn verify(&self) -> GraphResult<()> {
        for bond in &self.graph.bonds {
            if self.flags[bond.id.slot()].is_none() {
                return Err(GraphError::undetermined(bond.id));
            }
        }
        for node in &self.graph.nodes {
            let bonds = self.graph.node_bonds(node.id);
            match &node.kind {
                NodeKind::Junction(kind) => {
                    let det = kind.determining_effort_in();
                    let count = bonds
                        .iter()
                        .filter(|&&b| self.effort_in_at(b, node.id) == Some(det))
                        .count();
                    if count != 1 {
                        let bond = bonds.first().copied().unwrap_or(BondId::from_index(0));
                        return Err(GraphError::conflict(
                            &node.name,
                            bond,
                            "junction must have exactly one determining bond",
                        ));
                    }
                }
                NodeKind::TwoPort(element) => {
                    let (Some(port1), Some(port2)) = self.graph.two_port_bonds(node.id) else {
                        continue;
                    };
                    let c1 = self.effort_in_at(port1, node.id);
                    let c2 = self.effort_in_at(port2, node.id);
                    if c1.map(|c| element.rule().other(c)) != c2 {
                        return Err(GraphError::conflict(
                            &node.name,
                            port2,
                            "two-port causality rule violated",
                        ));
                    }
                }
                NodeKind::OnePort(element) => {
                    let policy = element.causality_policy();
                    if !policy.is_fixed() {
                        continue;
                    }
                    for &bond in bonds {
                        if self.effort_in_at(bond, node.id) != policy.effort_in() {
                            return Err(GraphError::conflict(
                                &node.name,
                                bond,
                                "fixed causality not honoured",
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Storage elements that ended up in derivative causality.
    fn audit(&self, opts: &AnalysisOptions) -> GraphResult<Vec<NodeId>> {
        let derivative: Vec<NodeId> = self
            .graph
            .nodes
            .iter()
            .filter(|node| {
                node.causality_policy()
                    .filter(|p| p.is_preferred())
                    .and_then(Causality::effort_in)
                    .zip(self.graph.node_bonds(node.id).first())
                    .is_some_and(|(preferred, &bond)| {
                        self.effort_in_at(bond, node.id) != Some(preferred)
                    })
            })
            .map(|node| node.id)
            .collect();

        if opts.reject_derivative_causality && !derivative.is_empty() {
            return Err(GraphError::DerivativeCausality {
                nodes: derivative
                    .iter()
                    .map(|&n| self.graph.node_name(n).to_string())
                    .collect(),
            });
        }
        Ok(derivative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_elements::{Capacitor, EffortSource, FlowSource, Inertia, Resistor, Transformer};

    fn resistor(name: &str) -> Resistor {
        Resistor::new(name, 1.0).unwrap()
    }

    #[test]
    fn flow_source_on_one_junction() {
        let mut graph = BondGraph::new();
        let sf = graph.add_one_port(FlowSource::new("pump")).unwrap();
        let j = graph.add_one_junction("j").unwrap();
        let r1 = graph.add_one_port(resistor("r1")).unwrap();
        let r2 = graph.add_one_port(resistor("r2")).unwrap();
        let b0 = graph.connect(sf, j).unwrap();
        let b1 = graph.connect(j, r1).unwrap();
        let b2 = graph.connect(j, r2).unwrap();

        let report = graph.assign_causalities().unwrap();
        assert!(report.arbitrary.is_empty());
        assert!(report.preferred_causalities_valid());
        assert_eq!(graph.bond(b0).unwrap().effort_in_at(j), Some(false));
        assert_eq!(graph.bond(b1).unwrap().effort_in_at(j), Some(true));
        assert_eq!(graph.bond(b2).unwrap().effort_in_at(j), Some(true));
        assert_eq!(
            report.steps[0],
            AssignmentStep::Fixed { node: sf, bond: b0 }
        );
    }

    #[test]
    fn two_effort_sources_on_zero_junction_conflict() {
        let mut graph = BondGraph::new();
        let a = graph.add_one_port(EffortSource::new("a")).unwrap();
        let b = graph.add_one_port(EffortSource::new("b")).unwrap();
        let j = graph.add_zero_junction("j").unwrap();
        graph.connect(a, j).unwrap();
        graph.connect(b, j).unwrap();

        let err = graph.assign_causalities().unwrap_err();
        assert!(matches!(
            err,
            GraphError::CausalityConflict { ref node, bond: 2, .. } if node == "j"
        ));
        assert!(graph.bonds().iter().all(|b| b.effort_in_at_to.is_none()));
    }

    #[test]
    fn storage_prefers_integral_causality() {
        let mut graph = BondGraph::new();
        let se = graph.add_one_port(EffortSource::new("se")).unwrap();
        let j = graph.add_one_junction("j").unwrap();
        let c = graph.add_one_port(Capacitor::new("c", 1.0).unwrap()).unwrap();
        let i = graph.add_one_port(Inertia::new("i", 1.0).unwrap()).unwrap();
        graph.connect(se, j).unwrap();
        let bc = graph.connect(j, c).unwrap();
        let bi = graph.connect(j, i).unwrap();

        let report = graph.assign_causalities().unwrap();
        // Choosing the capacitor first leaves the inertia its preferred side.
        assert_eq!(graph.bond(bi).unwrap().effort_in_at(i), Some(true));
        assert_eq!(graph.bond(bc).unwrap().effort_in_at(c), Some(false));
        assert!(report.derivative.is_empty());
        assert!(report
            .steps
            .iter()
            .any(|s| matches!(s, AssignmentStep::Preferred { .. })));
    }

    #[test]
    fn storage_falls_back_to_derivative() {
        let mut graph = BondGraph::new();
        let se = graph.add_one_port(EffortSource::new("se")).unwrap();
        let j = graph.add_zero_junction("j").unwrap();
        let c = graph.add_one_port(Capacitor::new("c", 1.0).unwrap()).unwrap();
        graph.connect(se, j).unwrap();
        graph.connect(j, c).unwrap();

        let report = graph.assign_causalities().unwrap();
        assert_eq!(report.derivative, vec![c]);

        graph.reset_causalities();
        let opts = AnalysisOptions {
            reject_derivative_causality: true,
            ..Default::default()
        };
        assert!(matches!(
            graph.assign_causalities_with(&opts),
            Err(GraphError::DerivativeCausality { .. })
        ));
        assert!(!graph.all_causalities_set());
    }

    #[test]
    fn residual_pass_uses_insertion_order() {
        let mut graph = BondGraph::new();
        let r1 = graph.add_one_port(resistor("r1")).unwrap();
        let r2 = graph.add_one_port(resistor("r2")).unwrap();
        let b = graph.connect(r2, r1).unwrap();

        let report = graph.assign_causalities().unwrap();
        assert_eq!(report.arbitrary, vec![b]);
        // r2 was inserted later and receives effort.
        assert_eq!(graph.bond(b).unwrap().causal_stroke(), Some(r2));

        graph.reset_causalities();
        assert!(matches!(
            graph.assign_causalities_with(&AnalysisOptions::strict()),
            Err(GraphError::AlgebraicLoop { .. })
        ));
    }

    #[test]
    fn transformer_propagates_opposite_causality() {
        let mut graph = BondGraph::new();
        let se = graph.add_one_port(EffortSource::new("se")).unwrap();
        let tf = graph.add_two_port(Transformer::new("tf", 2.0).unwrap()).unwrap();
        let r = graph.add_one_port(resistor("r")).unwrap();
        let b1 = graph.connect(se, tf).unwrap();
        let b2 = graph.connect(tf, r).unwrap();

        graph.assign_causalities().unwrap();
        assert_eq!(graph.bond(b1).unwrap().effort_in_at(tf), Some(true));
        assert_eq!(graph.bond(b2).unwrap().effort_in_at(tf), Some(false));
        assert_eq!(graph.bond(b2).unwrap().effort_in_at(r), Some(true));
    }

    #[test]
    fn second_run_requires_reset() {
        let mut graph = BondGraph::new();
        let se = graph.add_one_port(EffortSource::new("se")).unwrap();
        let r = graph.add_one_port(resistor("r")).unwrap();
        graph.connect(se, r).unwrap();

        graph.assign_causalities().unwrap();
        assert_eq!(
            graph.assign_causalities(),
            Err(GraphError::CausalityAlreadyAssigned)
        );
        assert_eq!(graph.connect(r, se), Err(GraphError::AnalysisStarted));
        graph.reset_causalities();
        assert!(graph.assign_causalities().is_ok());
    }
}
