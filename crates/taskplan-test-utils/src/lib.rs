//! Testing utilities for the taskplan workspace
//!
//! Shared plan fixtures and Markdown builders.

#![allow(missing_docs)]

use taskplan_core::decompose::render_task;
use taskplan_core::{Complexity, Task, TaskPlan};

/// Task with every field filled in and no preconditions declared
pub fn complete_task(id: u32) -> Task {
    Task::new(id, format!("Implement step {id}"))
        .with_file(format!("src/step_{id}.rs"))
        .with_step(format!("Write step {id}"))
        .with_step("Add unit tests")
        .done_when(format!("`cargo test step_{id}` passes"))
        .with_complexity(Complexity::Small)
}

/// Linear chain 1 <- 2 <- ... <- n that passes validation
pub fn chain_plan(n: u32) -> TaskPlan {
    let tasks = (1..=n)
        .map(|id| match id {
            1 => complete_task(id).without_preconditions(),
            _ => complete_task(id).depends_on(id - 1),
        })
        .collect();
    TaskPlan::new(tasks).with_title("Chain")
}

/// Render tasks under a plan title in task-plan Markdown
pub fn render_plan_markdown(title: &str, tasks: &[Task]) -> String {
    let body: Vec<String> = tasks.iter().map(render_task).collect();
    format!("# Task Plan: {title}\n\n---\n\n{}", body.join("\n"))
}

/// Well-formed three-task plan with a diamond-free chain
pub fn sample_plan_markdown() -> String {
    let tasks = chain_plan(3).tasks;
    render_plan_markdown("Sample", &tasks)
}

/// Three tasks: 1 has no preconditions, 2 depends on 1, 3 depends on 2 and
/// has no complexity line. Everything else is complete.
pub const MISSING_COMPLEXITY_PLAN: &str = "# Task Plan: Sizing Check

### Task 1: Add user model
- **Files:** `app/models/user.py`
- **Preconditions:** none
- **Steps:**
  1. Define the `User` model
- **Done when:** `pytest tests/models` passes
- **Complexity:** small

### Task 2: Add user schema
- **Files:** `app/schemas/user.py`
- **Preconditions:** Task 1
- **Steps:**
  1. Define request and response schemas
- **Done when:** `pytest tests/schemas` passes
- **Complexity:** trivial

### Task 3: Add user router
- **Files:** `app/routers/users.py`
- **Preconditions:** Task 2
- **Steps:**
  1. Add `GET /users/{id}`
- **Done when:** `pytest tests/routers` passes
";

/// Minimal three-task plan: no files or steps anywhere, Task 1 has no
/// preconditions line and Task 3 has no complexity line
pub const MINIMAL_SIZING_PLAN: &str = "# Task Plan: Minimal

### Task 1: Write backend tests
- **Done when:** pytest passes
- **Complexity:** small

### Task 2: Write frontend tests
- **Preconditions:** Task 1
- **Done when:** npm test passes
- **Complexity:** medium

### Task 3: Wire CI
- **Preconditions:** Task 2
- **Done when:** pytest passes
";

/// Tasks 2 and 3 depend on each other
pub const CYCLIC_PLAN: &str = "# Task Plan: Cycle

### Task 1: Base
- **Files:** `a.rs`
- **Preconditions:** none
- **Steps:**
  1. Write a
- **Done when:** `cargo test a` passes
- **Complexity:** small

### Task 2: Left
- **Files:** `b.rs`
- **Preconditions:** Task 1, Task 3
- **Steps:**
  1. Write b
- **Done when:** `cargo test b` passes
- **Complexity:** small

### Task 3: Right
- **Files:** `c.rs`
- **Preconditions:** Task 2
- **Steps:**
  1. Write c
- **Done when:** `cargo test c` passes
- **Complexity:** small
";

/// Task 2 refers to a task that does not exist
pub const UNKNOWN_REFERENCE_PLAN: &str = "# Task Plan: Dangling

### Task 1: Base
- **Files:** `a.rs`
- **Preconditions:** none
- **Steps:**
  1. Write a
- **Done when:** `cargo test a` passes
- **Complexity:** small

### Task 2: Dependent
- **Files:** `b.rs`
- **Preconditions:** Task 7
- **Steps:**
  1. Write b
- **Done when:** `cargo test b` passes
- **Complexity:** small
";
