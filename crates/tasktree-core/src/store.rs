//! The in-memory task store and its graph algorithms.
//!
//! `TaskStore` owns every task record plus the "current task" pointer used
//! in single-agent mode. It never errors: lookups return `Option`, and both
//! graph walks degrade by omission when a referenced task is missing.
//!
//! The store has no locking of its own. The server wraps it in a
//! `tokio::sync::RwLock`; each request is one read-modify-write against
//! that lock.

use std::collections::{HashMap, HashSet};

use crate::{Task, TaskId};

/// Authoritative owner of all task records and the current-task pointer.
#[derive(Debug, Default)]
pub struct TaskStore {
    /// Tasks indexed by TaskId.
    tasks: HashMap<TaskId, Task>,

    /// At most one in-progress task in single-agent mode. Never validated
    /// against the map.
    current_task: Option<TaskId>,
}

impl TaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record for `task_id`. No validation; callers
    /// are responsible for record integrity.
    pub fn set(&mut self, task_id: TaskId, task: Task) {
        self.tasks.insert(task_id, task);
    }

    /// Get the record for `task_id`, or `None` if not found.
    pub fn get(&self, task_id: &TaskId) -> Option<&Task> {
        self.tasks.get(task_id)
    }

    /// Get a mutable reference to the record for `task_id`. Mutations are
    /// visible to every later read; the store holds the single shared
    /// instance.
    pub fn get_mut(&mut self, task_id: &TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(task_id)
    }

    /// Set the current-task pointer. The referenced task is not required to
    /// exist or to be in-progress.
    pub fn set_current_task(&mut self, task_id: TaskId) {
        self.current_task = Some(task_id);
    }

    /// Get the current-task pointer, if set.
    pub fn current_task(&self) -> Option<&TaskId> {
        self.current_task.as_ref()
    }

    /// Number of stored tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterate over all stored tasks in unspecified order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Every task reachable from `task_id` by following dependency edges in
    /// either direction - the weakly-connected component containing the
    /// task, including the task itself.
    ///
    /// Iterative fixed-point expansion: each full pass walks the current
    /// member set, adding forward targets (`depends_on_task_ids`) and
    /// reverse sources (any stored task that lists the member as a
    /// dependency), until a pass adds nothing. Membership is checked before
    /// insertion, so cycles stop contributing once all their nodes are in.
    /// Records are returned in the order their ids were first added.
    ///
    /// The per-pass scan over all records is quadratic. Dependency graphs
    /// here are tens of nodes; an adjacency index would buy nothing.
    pub fn all_in_tree(&self, task_id: &TaskId) -> Vec<&Task> {
        let mut members: Vec<TaskId> = vec![task_id.clone()];

        loop {
            let before = members.len();
            let snapshot = members.clone();

            for id in &snapshot {
                // Forward edges: everything this member depends on.
                if let Some(task) = self.tasks.get(id) {
                    for dep in &task.depends_on_task_ids {
                        if !members.contains(dep) {
                            members.push(dep.clone());
                        }
                    }
                }

                // Reverse edges: everything that depends on this member.
                for (dependent_id, dependent) in &self.tasks {
                    if dependent.depends_on_task_ids.contains(id)
                        && !members.contains(dependent_id)
                    {
                        members.push(dependent_id.clone());
                    }
                }
            }

            if members.len() == before {
                break;
            }
        }

        // Ids without a record (dangling references, or an unknown start
        // task) are dropped here rather than surfaced as errors.
        members.iter().filter_map(|id| self.tasks.get(id)).collect()
    }

    /// The incomplete tasks of `task_id`'s tree, in a valid execution
    /// order: every task appears after all of its still-incomplete
    /// dependencies, with ties broken in favor of `critical_path` tasks.
    ///
    /// Kahn's topological sort restricted to edges between incomplete
    /// tasks. Edges to done/failed tasks are already satisfied and edges to
    /// missing records are ignored, so neither counts toward in-degree. The
    /// ready queue is re-sorted before every pop, so a task that just
    /// reached in-degree zero immediately competes with everything already
    /// waiting; the comparator is stable, so equal-priority tasks keep FIFO
    /// order.
    ///
    /// Tasks caught in a dependency cycle never reach in-degree zero and
    /// are silently absent from the result.
    pub fn incomplete_tasks_in_tree(&self, task_id: &TaskId) -> Vec<&Task> {
        let incomplete: Vec<&Task> = self
            .all_in_tree(task_id)
            .into_iter()
            .filter(|t| t.status.is_incomplete())
            .collect();

        let member_ids: HashSet<&TaskId> = incomplete.iter().map(|t| &t.id).collect();

        // Remaining incomplete-dependency count per task.
        let mut remaining: HashMap<&TaskId, usize> = incomplete
            .iter()
            .map(|t| {
                let count = t
                    .depends_on_task_ids
                    .iter()
                    .filter(|dep| member_ids.contains(dep))
                    .count();
                (&t.id, count)
            })
            .collect();

        let mut ready: Vec<&Task> = incomplete
            .iter()
            .copied()
            .filter(|t| remaining[&t.id] == 0)
            .collect();

        let mut ordered: Vec<&Task> = Vec::with_capacity(incomplete.len());

        while !ready.is_empty() {
            // Critical-path tasks sort first; `false < true`, so the key is
            // the negated flag. Stable sort keeps insertion order for ties.
            ready.sort_by_key(|t| !t.critical_path);
            let next = ready.remove(0);
            ordered.push(next);

            for candidate in incomplete.iter().copied() {
                if candidate.id == next.id
                    || !candidate.depends_on_task_ids.contains(&next.id)
                {
                    continue;
                }
                if let Some(count) = remaining.get_mut(&candidate.id) {
                    if *count > 0 {
                        *count -= 1;
                        if *count == 0 {
                            ready.push(candidate);
                        }
                    }
                }
            }
        }

        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Task, TaskStatus};

    fn task(id: &str) -> Task {
        Task::new(id, "", "", "test").with_id(TaskId::new(id))
    }

    fn insert(store: &mut TaskStore, task: Task) {
        store.set(task.id.clone(), task);
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.as_str().to_string()).collect()
    }

    fn id_set(tasks: &[&Task]) -> HashSet<String> {
        tasks.iter().map(|t| t.id.as_str().to_string()).collect()
    }

    #[test]
    fn test_set_and_get() {
        let mut store = TaskStore::new();
        insert(&mut store, task("a"));

        assert!(store.get(&TaskId::new("a")).is_some());
        assert!(store.get(&TaskId::new("missing")).is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = TaskStore::new();
        insert(&mut store, task("a"));

        let mut replacement = task("a");
        replacement.title = "replaced".to_string();
        insert(&mut store, replacement);

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&TaskId::new("a")).unwrap().title, "replaced");
    }

    #[test]
    fn test_get_mut_mutations_visible() {
        let mut store = TaskStore::new();
        insert(&mut store, task("a"));

        store.get_mut(&TaskId::new("a")).unwrap().status = TaskStatus::Done;

        assert_eq!(store.get(&TaskId::new("a")).unwrap().status, TaskStatus::Done);
    }

    #[test]
    fn test_current_task_pointer() {
        let mut store = TaskStore::new();
        assert!(store.current_task().is_none());

        // Pointer is not validated against the map.
        store.set_current_task(TaskId::new("nowhere"));
        assert_eq!(store.current_task().unwrap().as_str(), "nowhere");
    }

    // --- all_in_tree -----------------------------------------------------

    #[test]
    fn test_tree_includes_start_task() {
        let mut store = TaskStore::new();
        insert(&mut store, task("solo"));
        insert(&mut store, task("unrelated"));

        let tree = store.all_in_tree(&TaskId::new("solo"));
        assert_eq!(ids(&tree), vec!["solo"]);
    }

    #[test]
    fn test_tree_unknown_start_is_empty() {
        let mut store = TaskStore::new();
        insert(&mut store, task("a"));

        let tree = store.all_in_tree(&TaskId::new("ghost"));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_tree_follows_forward_edges() {
        let mut store = TaskStore::new();
        insert(&mut store, task("c"));
        insert(&mut store, task("b").with_dependencies(vec![TaskId::new("c")]));
        insert(&mut store, task("a").with_dependencies(vec![TaskId::new("b")]));

        let tree = store.all_in_tree(&TaskId::new("a"));
        assert_eq!(ids(&tree), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_tree_follows_reverse_edges() {
        let mut store = TaskStore::new();
        insert(&mut store, task("c"));
        insert(&mut store, task("b").with_dependencies(vec![TaskId::new("c")]));
        insert(&mut store, task("a").with_dependencies(vec![TaskId::new("b")]));

        // Starting from the deepest dependency reaches the whole component.
        let tree = store.all_in_tree(&TaskId::new("c"));
        assert_eq!(id_set(&tree), HashSet::from_iter(["a", "b", "c"].map(String::from)));
    }

    #[test]
    fn test_tree_symmetry_across_component() {
        let mut store = TaskStore::new();
        insert(&mut store, task("d"));
        insert(&mut store, task("c").with_dependencies(vec![TaskId::new("d")]));
        insert(&mut store, task("b").with_dependencies(vec![TaskId::new("d")]));
        insert(
            &mut store,
            task("a").with_dependencies(vec![TaskId::new("b"), TaskId::new("c")]),
        );
        insert(&mut store, task("other-component"));

        let from_a = id_set(&store.all_in_tree(&TaskId::new("a")));
        let from_d = id_set(&store.all_in_tree(&TaskId::new("d")));
        let from_b = id_set(&store.all_in_tree(&TaskId::new("b")));

        assert_eq!(from_a, from_d);
        assert_eq!(from_a, from_b);
        assert!(!from_a.contains("other-component"));
    }

    #[test]
    fn test_tree_cycle_terminates() {
        let mut store = TaskStore::new();
        insert(&mut store, task("a").with_dependencies(vec![TaskId::new("b")]));
        insert(&mut store, task("b").with_dependencies(vec![TaskId::new("a")]));

        let tree = store.all_in_tree(&TaskId::new("a"));
        assert_eq!(id_set(&tree), HashSet::from_iter(["a", "b"].map(String::from)));
    }

    #[test]
    fn test_tree_ignores_dangling_references() {
        let mut store = TaskStore::new();
        insert(&mut store, task("b"));
        insert(
            &mut store,
            task("a").with_dependencies(vec![TaskId::new("never-created"), TaskId::new("b")]),
        );

        let tree = store.all_in_tree(&TaskId::new("a"));
        assert_eq!(id_set(&tree), HashSet::from_iter(["a", "b"].map(String::from)));
    }

    // --- incomplete_tasks_in_tree ----------------------------------------

    #[test]
    fn test_ordering_linear_chain() {
        let mut store = TaskStore::new();
        insert(&mut store, task("c"));
        insert(&mut store, task("b").with_dependencies(vec![TaskId::new("c")]));
        insert(&mut store, task("a").with_dependencies(vec![TaskId::new("b")]));

        let order = store.incomplete_tasks_in_tree(&TaskId::new("a"));
        assert_eq!(ids(&order), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_ordering_excludes_done_and_failed() {
        let mut store = TaskStore::new();
        let mut b = task("b");
        b.status = TaskStatus::Done;
        let mut c = task("c");
        c.status = TaskStatus::Failed;
        insert(&mut store, b);
        insert(&mut store, c);
        insert(
            &mut store,
            task("a").with_dependencies(vec![TaskId::new("b"), TaskId::new("c")]),
        );

        let order = store.incomplete_tasks_in_tree(&TaskId::new("a"));
        assert_eq!(ids(&order), vec!["a"]);
    }

    #[test]
    fn test_ordering_critical_path_tie_break() {
        let mut store = TaskStore::new();
        insert(&mut store, task("x"));
        insert(&mut store, task("y").with_critical_path(true));
        insert(
            &mut store,
            task("a").with_dependencies(vec![TaskId::new("x"), TaskId::new("y")]),
        );

        let order = store.incomplete_tasks_in_tree(&TaskId::new("a"));
        assert_eq!(ids(&order), vec!["y", "x", "a"]);
    }

    #[test]
    fn test_ordering_priority_fan_in() {
        let mut store = TaskStore::new();
        insert(&mut store, task("b").with_critical_path(true));
        insert(&mut store, task("c").with_critical_path(true));
        insert(&mut store, task("d"));
        insert(&mut store, task("e"));
        insert(
            &mut store,
            task("a").with_dependencies(vec![
                TaskId::new("b"),
                TaskId::new("c"),
                TaskId::new("d"),
                TaskId::new("e"),
            ]),
        );

        // Critical tasks first, each group keeping its original relative
        // order, with the dependent last.
        let order = store.incomplete_tasks_in_tree(&TaskId::new("a"));
        assert_eq!(ids(&order), vec!["b", "c", "d", "e", "a"]);
    }

    #[test]
    fn test_ordering_diamond() {
        let mut store = TaskStore::new();
        insert(&mut store, task("d"));
        insert(
            &mut store,
            task("b")
                .with_dependencies(vec![TaskId::new("d")])
                .with_critical_path(true),
        );
        insert(&mut store, task("c").with_dependencies(vec![TaskId::new("d")]));
        insert(
            &mut store,
            task("a").with_dependencies(vec![TaskId::new("b"), TaskId::new("c")]),
        );

        let order = store.incomplete_tasks_in_tree(&TaskId::new("a"));
        assert_eq!(ids(&order), vec!["d", "b", "c", "a"]);
    }

    #[test]
    fn test_ordering_is_topologically_valid() {
        let mut store = TaskStore::new();
        insert(&mut store, task("f"));
        insert(&mut store, task("e").with_dependencies(vec![TaskId::new("f")]));
        insert(&mut store, task("d").with_dependencies(vec![TaskId::new("f")]));
        insert(
            &mut store,
            task("c")
                .with_dependencies(vec![TaskId::new("d"), TaskId::new("e")])
                .with_critical_path(true),
        );
        insert(&mut store, task("b").with_dependencies(vec![TaskId::new("d")]));
        insert(
            &mut store,
            task("a").with_dependencies(vec![TaskId::new("b"), TaskId::new("c")]),
        );

        let order = store.incomplete_tasks_in_tree(&TaskId::new("a"));
        let positions: HashMap<&str, usize> = order
            .iter()
            .enumerate()
            .map(|(i, t)| (t.id.as_str(), i))
            .collect();

        assert_eq!(order.len(), 6);
        for t in &order {
            for dep in &t.depends_on_task_ids {
                if let Some(dep_pos) = positions.get(dep.as_str()) {
                    assert!(
                        dep_pos < &positions[t.id.as_str()],
                        "{} must come before {}",
                        dep,
                        t.id
                    );
                }
            }
        }
    }

    #[test]
    fn test_ordering_zero_edges_is_immediately_ready() {
        let mut store = TaskStore::new();
        insert(&mut store, task("solo"));

        let order = store.incomplete_tasks_in_tree(&TaskId::new("solo"));
        assert_eq!(ids(&order), vec!["solo"]);
    }

    #[test]
    fn test_ordering_ignores_dangling_dependency() {
        let mut store = TaskStore::new();
        insert(&mut store, task("b"));
        insert(
            &mut store,
            task("a").with_dependencies(vec![TaskId::new("never-created"), TaskId::new("b")]),
        );

        // The missing dependency does not block execution.
        let order = store.incomplete_tasks_in_tree(&TaskId::new("a"));
        assert_eq!(ids(&order), vec!["b", "a"]);
    }

    #[test]
    fn test_ordering_drops_incomplete_cycle() {
        let mut store = TaskStore::new();
        insert(&mut store, task("a").with_dependencies(vec![TaskId::new("b")]));
        insert(&mut store, task("b").with_dependencies(vec![TaskId::new("a")]));
        insert(&mut store, task("c").with_dependencies(vec![TaskId::new("a")]));

        // Cycle members never reach in-degree zero; c waits on the cycle.
        let order = store.incomplete_tasks_in_tree(&TaskId::new("a"));
        assert!(order.is_empty());
    }

    #[test]
    fn test_ordering_done_dependency_inside_chain() {
        let mut store = TaskStore::new();
        let mut mid = task("mid").with_dependencies(vec![TaskId::new("base")]);
        mid.status = TaskStatus::Done;
        insert(&mut store, task("base"));
        insert(&mut store, mid);
        insert(&mut store, task("top").with_dependencies(vec![TaskId::new("mid")]));

        // `mid` is done: it disappears from the ordering and `top` is not
        // blocked by it, but `base` is still part of the tree.
        let order = store.incomplete_tasks_in_tree(&TaskId::new("top"));
        assert_eq!(id_set(&order), HashSet::from_iter(["top", "base"].map(String::from)));
    }
}
