//! Player progression: coins, first-run flag, daily tasks
//!
//! Read JSON from the store, mutate, write back. The core only talks to
//! this at run boundaries: the onboarding flag going in, a run summary's
//! deltas coming out. Dates are passed in as strings so nothing here reads
//! a wall clock.

use serde::{Deserialize, Serialize};

use crate::sim::RunSummary;
use crate::storage::KeyValueStore;

const STORAGE_KEY: &str = "shift_runner_data";

/// Which run statistic a daily task tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    /// Seconds survived
    Survival,
    /// Lane shifts made
    Action,
    /// Perfect shifts landed
    Skill,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyTask {
    pub id: String,
    pub category: TaskCategory,
    pub target: u32,
    pub reward: u32,
    pub label: String,
    pub progress: u32,
    pub completed: bool,
    pub claimed: bool,
}

impl DailyTask {
    fn new(id: &str, category: TaskCategory, target: u32, reward: u32, label: &str) -> Self {
        Self {
            id: id.to_string(),
            category,
            target,
            reward,
            label: label.to_string(),
            progress: 0,
            completed: false,
            claimed: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProgressionData {
    total_coins: u32,
    has_played: bool,
    last_task_date: String,
    daily_tasks: Vec<DailyTask>,
}

impl Default for ProgressionData {
    fn default() -> Self {
        Self {
            total_coins: 0,
            has_played: false,
            last_task_date: String::new(),
            daily_tasks: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProgressionManager {
    data: ProgressionData,
    coins_this_run: u32,
    double_claimed: bool,
}

impl ProgressionManager {
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let data = store
            .get(STORAGE_KEY)
            .and_then(|json| match serde_json::from_str(&json) {
                Ok(data) => Some(data),
                Err(e) => {
                    log::warn!("Corrupt progression data, using defaults: {e}");
                    None
                }
            })
            .unwrap_or_default();
        Self {
            data,
            coins_this_run: 0,
            double_claimed: false,
        }
    }

    fn save(&self, store: &mut dyn KeyValueStore) {
        if let Ok(json) = serde_json::to_string(&self.data) {
            store.set(STORAGE_KEY, &json);
        }
    }

    /// Whether the player has ever started a run (onboarding gate).
    pub fn has_played(&self) -> bool {
        self.data.has_played
    }

    pub fn mark_played(&mut self, store: &mut dyn KeyValueStore) {
        if !self.data.has_played {
            self.data.has_played = true;
            self.save(store);
        }
    }

    pub fn total_coins(&self) -> u32 {
        self.data.total_coins
    }

    pub fn coins_this_run(&self) -> u32 {
        self.coins_this_run
    }

    pub fn reset_run(&mut self) {
        self.coins_this_run = 0;
        self.double_claimed = false;
    }

    pub fn add_coins(&mut self, amount: u32, store: &mut dyn KeyValueStore) {
        self.coins_this_run += amount;
        self.data.total_coins += amount;
        self.save(store);
    }

    /// Spend from the wallet (market purchases). Returns whether the
    /// balance covered it.
    pub fn spend_coins(&mut self, amount: u32, store: &mut dyn KeyValueStore) -> bool {
        if self.data.total_coins < amount {
            return false;
        }
        self.data.total_coins -= amount;
        self.save(store);
        true
    }

    /// One-shot reward doubling for the finished run.
    pub fn double_coins_for_run(&mut self, store: &mut dyn KeyValueStore) -> bool {
        if self.coins_this_run == 0 || self.double_claimed {
            return false;
        }
        self.data.total_coins += self.coins_this_run;
        self.coins_this_run *= 2;
        self.double_claimed = true;
        self.save(store);
        true
    }

    /// Regenerate the daily task set when the date rolls over.
    pub fn roll_tasks(&mut self, today: &str, store: &mut dyn KeyValueStore) {
        if self.data.last_task_date == today {
            return;
        }
        self.data.daily_tasks = vec![
            DailyTask::new("survive_30", TaskCategory::Survival, 30, 100, "Survive 30s"),
            DailyTask::new("shifts_50", TaskCategory::Action, 50, 100, "Make 50 shifts"),
            DailyTask::new(
                "perfect_10",
                TaskCategory::Skill,
                10,
                150,
                "Get 10 perfect shifts",
            ),
        ];
        self.data.last_task_date = today.to_string();
        self.save(store);
        log::info!("Daily tasks rolled for {today}");
    }

    pub fn tasks(&self) -> &[DailyTask] {
        &self.data.daily_tasks
    }

    /// Add progress to every incomplete task in a category.
    pub fn update_task_progress(
        &mut self,
        category: TaskCategory,
        amount: u32,
        store: &mut dyn KeyValueStore,
    ) {
        let mut changed = false;
        for task in &mut self.data.daily_tasks {
            if task.category == category && !task.completed {
                task.progress = (task.progress + amount).min(task.target);
                if task.progress >= task.target {
                    task.completed = true;
                }
                changed = true;
            }
        }
        if changed {
            self.save(store);
        }
    }

    /// Feed a finished run's deltas into coins and task tracking.
    pub fn apply_run_summary(&mut self, summary: &RunSummary, store: &mut dyn KeyValueStore) {
        if summary.coins_earned > 0 {
            self.add_coins(summary.coins_earned, store);
        }
        self.update_task_progress(TaskCategory::Survival, summary.time_survived as u32, store);
        self.update_task_progress(TaskCategory::Action, summary.shifts, store);
        self.update_task_progress(TaskCategory::Skill, summary.perfect_shifts, store);
    }

    /// Claim a completed task's reward. Returns the coins granted.
    pub fn claim_reward(&mut self, task_id: &str, store: &mut dyn KeyValueStore) -> u32 {
        let Some(task) = self
            .data
            .daily_tasks
            .iter_mut()
            .find(|t| t.id == task_id)
        else {
            return 0;
        };
        if !task.completed || task.claimed {
            return 0;
        }
        task.claimed = true;
        let reward = task.reward;
        self.data.total_coins += reward;
        self.save(store);
        reward
    }
}
