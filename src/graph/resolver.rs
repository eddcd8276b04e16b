//! Execution-order resolution for a process's operation graph.

use super::connection::Connection;
use super::operation::Operation;
use super::OperationId;
use crate::error::CycleError;
use indexmap::{IndexMap, IndexSet};
use std::collections::VecDeque;
use tracing::warn;

/// Produces an order in which every operation appears after every
/// operation it reads from, or fails when the graph admits no such order.
///
/// Independent operations keep the insertion order of the operation
/// table, so resolving the same graph repeatedly gives the same schedule.
pub fn resolve_execution_order(
    operations: &IndexMap<OperationId, Operation>,
) -> Result<Vec<OperationId>, CycleError> {
    let mut in_degree: IndexMap<&OperationId, usize> =
        operations.keys().map(|id| (id, 0usize)).collect();
    let mut consumers: IndexMap<&OperationId, Vec<&OperationId>> =
        operations.keys().map(|id| (id, Vec::new())).collect();

    for (id, operation) in operations {
        for (_, connection) in operation.wired_connections() {
            let Connection::FromOperation {
                operation: producer,
                ..
            } = connection
            else {
                // Edges from the enclosing process's inputs carry no
                // in-graph dependency.
                continue;
            };
            if let Some(list) = consumers.get_mut(producer) {
                list.push(id);
                if let Some(degree) = in_degree.get_mut(id) {
                    *degree += 1;
                }
            }
        }
    }

    let mut ready: VecDeque<&OperationId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();
    let mut order: Vec<OperationId> = Vec::with_capacity(operations.len());

    while let Some(id) = ready.pop_front() {
        order.push(id.clone());
        if let Some(list) = consumers.get(id) {
            for consumer in list {
                if let Some(degree) = in_degree.get_mut(*consumer) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push_back(*consumer);
                    }
                }
            }
        }
    }

    if order.len() != operations.len() {
        let member = cycle_member(operations, &in_degree);
        warn!(operation = %member, "dependency cycle detected");
        return Err(CycleError {
            operation_id: member,
        });
    }

    Ok(order)
}

/// Walks producer edges among the unfinished operations until one repeats;
/// the repeated operation necessarily lies on a cycle.
fn cycle_member(
    operations: &IndexMap<OperationId, Operation>,
    in_degree: &IndexMap<&OperationId, usize>,
) -> OperationId {
    let remaining: IndexSet<&OperationId> = in_degree
        .iter()
        .filter(|(_, degree)| **degree > 0)
        .map(|(id, _)| *id)
        .collect();

    let mut seen: IndexSet<&OperationId> = IndexSet::new();
    let mut current = remaining.first().copied();

    while let Some(id) = current {
        if !seen.insert(id) {
            return id.clone();
        }
        current = operations.get(id).and_then(|operation| {
            operation
                .wired_connections()
                .find_map(|(_, connection)| match connection {
                    Connection::FromOperation {
                        operation: producer,
                        ..
                    } => remaining.get(producer).copied(),
                    Connection::FromProcessInput { .. } => None,
                })
        });
    }

    // Unreachable for a consistent degree table: every unfinished
    // operation keeps at least one unfinished producer.
    remaining
        .first()
        .map(|id| (*id).clone())
        .unwrap_or_default()
}
