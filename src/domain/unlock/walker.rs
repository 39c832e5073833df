//! 顺序解锁状态机
//!
//! 在一份目录快照上按文档顺序消耗预算：
//! 模块按 order 升序，模块内章节按 order 升序。
//! 遇到第一个负担不起的付费模块或付费章节时整个遍历停止，
//! 后续模块即使单独负担得起也不会被解锁。

use uuid::Uuid;

use crate::domain::catalog::{ChapterMode, ModuleMode, Price};

/// 参与遍历的章节快照
#[derive(Debug, Clone)]
pub struct ChapterSlot {
    pub id: Uuid,
    pub title: String,
    pub order: i64,
    pub mode: ChapterMode,
    pub price: Price,
}

/// 参与遍历的模块快照（章节已按 order 升序排列）
#[derive(Debug, Clone)]
pub struct ModuleSlot {
    pub id: Uuid,
    pub title: String,
    pub order: i64,
    pub mode: ModuleMode,
    pub price: Price,
    pub chapters: Vec<ChapterSlot>,
}

/// 遍历状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    /// 正在扫描第 `next` 个模块
    ScanningModules { next: usize },
    /// 正在扫描第 `module` 个模块内的第 `next` 个章节
    ScanningChapters { module: usize, next: usize },
    /// 预算不足，遍历中止
    Halted,
    /// 所有模块扫描完毕
    Done,
}

impl WalkState {
    pub fn is_finished(&self) -> bool {
        matches!(self, WalkState::Halted | WalkState::Done)
    }
}

/// 单次解锁动作
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockStep {
    Module {
        module_id: Uuid,
        title: String,
        order: i64,
        price: Price,
        budget_after: i64,
    },
    Chapter {
        module_id: Uuid,
        module_mode: ModuleMode,
        chapter_id: Uuid,
        title: String,
        order: i64,
        price: Price,
        budget_after: i64,
    },
}

impl UnlockStep {
    pub fn price(&self) -> Price {
        match self {
            UnlockStep::Module { price, .. } | UnlockStep::Chapter { price, .. } => *price,
        }
    }

    pub fn budget_after(&self) -> i64 {
        match self {
            UnlockStep::Module { budget_after, .. } | UnlockStep::Chapter { budget_after, .. } => {
                *budget_after
            }
        }
    }
}

/// 两级状态机：`ScanningModules` ⇄ `ScanningChapters`，终态为 `Halted` / `Done`
///
/// 作为迭代器使用，每次 `next()` 推进到下一个解锁动作或终态。
pub struct UnlockWalker<'a> {
    modules: &'a [ModuleSlot],
    remaining: i64,
    state: WalkState,
}

impl<'a> UnlockWalker<'a> {
    pub fn new(modules: &'a [ModuleSlot], budget: i64) -> Self {
        let state = if budget <= 0 {
            WalkState::Done
        } else {
            WalkState::ScanningModules { next: 0 }
        };
        Self {
            modules,
            remaining: budget.max(0),
            state,
        }
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    pub fn remaining_budget(&self) -> i64 {
        self.remaining
    }

    fn afford(&mut self, price: Price) -> bool {
        if self.remaining >= price.value() {
            self.remaining -= price.value();
            true
        } else {
            false
        }
    }

    fn scan_module(&mut self, index: usize) -> Option<UnlockStep> {
        let modules = self.modules;
        let Some(module) = modules.get(index) else {
            self.state = WalkState::Done;
            return None;
        };

        match module.mode {
            ModuleMode::Paid => {
                if self.afford(module.price) {
                    self.state = WalkState::ScanningChapters {
                        module: index,
                        next: 0,
                    };
                    Some(UnlockStep::Module {
                        module_id: module.id,
                        title: module.title.clone(),
                        order: module.order,
                        price: module.price,
                        budget_after: self.remaining,
                    })
                } else {
                    self.state = WalkState::Halted;
                    None
                }
            }
            ModuleMode::Published | ModuleMode::Rent => {
                self.state = WalkState::ScanningChapters {
                    module: index,
                    next: 0,
                };
                None
            }
            ModuleMode::Draft => {
                self.state = WalkState::ScanningModules { next: index + 1 };
                None
            }
        }
    }

    fn scan_chapter(&mut self, module_index: usize, index: usize) -> Option<UnlockStep> {
        let modules = self.modules;
        let module = &modules[module_index];
        let Some(chapter) = module.chapters.get(index) else {
            self.state = WalkState::ScanningModules {
                next: module_index + 1,
            };
            return None;
        };

        if chapter.mode != ChapterMode::Paid {
            self.state = WalkState::ScanningChapters {
                module: module_index,
                next: index + 1,
            };
            return None;
        }

        if !self.afford(chapter.price) {
            // 章节负担不起同样中止整个遍历
            self.state = WalkState::Halted;
            return None;
        }

        self.state = WalkState::ScanningChapters {
            module: module_index,
            next: index + 1,
        };
        // 付费模块在本轮被解锁后，其章节归属于已发布模块
        let module_mode = match module.mode {
            ModuleMode::Rent => ModuleMode::Rent,
            _ => ModuleMode::Published,
        };
        Some(UnlockStep::Chapter {
            module_id: module.id,
            module_mode,
            chapter_id: chapter.id,
            title: chapter.title.clone(),
            order: chapter.order,
            price: chapter.price,
            budget_after: self.remaining,
        })
    }
}

impl Iterator for UnlockWalker<'_> {
    type Item = UnlockStep;

    fn next(&mut self) -> Option<UnlockStep> {
        loop {
            let step = match self.state {
                WalkState::Halted | WalkState::Done => return None,
                WalkState::ScanningModules { next } => self.scan_module(next),
                WalkState::ScanningChapters { module, next } => self.scan_chapter(module, next),
            };
            if step.is_some() {
                return step;
            }
        }
    }
}
