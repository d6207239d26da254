use proptest::prelude::*;
use taskplan_core::prelude::*;
use taskplan_core::PreconditionGraph;
use taskplan_test_utils::complete_task;

/// Plan where task `i` may only depend on tasks `< i`
fn forward_plan(deps: &[Vec<u32>]) -> TaskPlan {
    let tasks = deps
        .iter()
        .zip(1u32..)
        .map(|(targets, id)| {
            let mut task = complete_task(id).without_preconditions();
            for &t in targets {
                if t < id {
                    task = task.depends_on(t);
                }
            }
            task
        })
        .collect();
    TaskPlan::new(tasks)
}

proptest! {
    #[test]
    fn prop_forward_dependencies_always_pass(
        deps in proptest::collection::vec(proptest::collection::vec(1..20u32, 0..4), 1..20)
    ) {
        let plan = forward_plan(&deps);
        let report = validate_plan(&plan);

        prop_assert!(report.passed, "{:?}", report.errors);
        let waves = report.execution_waves.expect("acyclic plan has waves");
        let scheduled: usize = waves.iter().map(Vec::len).sum();
        prop_assert_eq!(scheduled, plan.len());
    }

    #[test]
    fn prop_waves_respect_preconditions(
        deps in proptest::collection::vec(proptest::collection::vec(1..20u32, 0..4), 1..20)
    ) {
        let plan = forward_plan(&deps);
        let waves = PreconditionGraph::build(&plan).execution_waves().unwrap();
        let wave_of = |id: TaskId| waves.iter().position(|w| w.contains(&id)).unwrap();

        for task in &plan.tasks {
            for &dep in task.preconditions.ids() {
                prop_assert!(wave_of(dep) < wave_of(task.id));
            }
        }
    }

    #[test]
    fn prop_ring_is_one_cycle(len in 2..12u32, offset in 0..5u32) {
        // Tasks offset+1 ..= offset+len, each depending on the next, last on first
        let first = offset + 1;
        let last = offset + len;
        let mut tasks: Vec<Task> = (1..=offset)
            .map(|id| complete_task(id).without_preconditions())
            .collect();
        for id in first..=last {
            let next = if id == last { first } else { id + 1 };
            tasks.push(complete_task(id).depends_on(next));
        }
        let report = validate_plan(&TaskPlan::new(tasks));

        prop_assert!(!report.passed);
        let cycles: Vec<&Finding> = report.findings_for(Rule::Acyclic).collect();
        prop_assert_eq!(cycles.len(), 1);
        let expected: Vec<TaskId> = (first..=last).map(TaskId).collect();
        prop_assert_eq!(&cycles[0].tasks, &expected);
    }
}
