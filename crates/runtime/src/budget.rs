use foundation::time::Millis;

/// Soft wall-clock budget for one composition pass.
///
/// Exceeding the budget is reported, never enforced: a pass always runs to
/// completion and the caller decides how loudly to complain.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FrameBudget {
    budget_ms: i64,
}

impl FrameBudget {
    pub fn new(budget_ms: i64) -> Self {
        Self {
            budget_ms: budget_ms.max(0),
        }
    }

    /// 60 fps frame.
    pub fn sixty_fps() -> Self {
        Self::new(16)
    }

    pub fn budget_ms(&self) -> i64 {
        self.budget_ms
    }

    pub fn start(&self, now: Millis) -> BudgetSpan {
        BudgetSpan {
            started: now,
            budget_ms: self.budget_ms,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BudgetSpan {
    started: Millis,
    budget_ms: i64,
}

impl BudgetSpan {
    pub fn finish(self, now: Millis) -> BudgetReport {
        let elapsed_ms = now.since(self.started).max(0);
        BudgetReport {
            elapsed_ms,
            budget_ms: self.budget_ms,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BudgetReport {
    pub elapsed_ms: i64,
    pub budget_ms: i64,
}

impl BudgetReport {
    pub fn is_over_budget(&self) -> bool {
        self.elapsed_ms > self.budget_ms
    }
}
