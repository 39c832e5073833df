//! Event Publisher Implementation
//!
//! 解锁与资金事件的广播，通过 SSE 推送给订阅者

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::application::engine::{ContentKind, UnlockOutcome};

/// 资金事件类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum FundingEvent {
    /// 模块已解锁
    ModuleUnlocked {
        novel_id: Uuid,
        module_id: Uuid,
        title: String,
        price: i64,
        budget_after: i64,
    },
    /// 章节已解锁
    ChapterUnlocked {
        novel_id: Uuid,
        module_id: Uuid,
        chapter_id: Uuid,
        title: String,
        price: i64,
        budget_after: i64,
    },
    /// 租借模块转为已发布
    ModuleSwitched {
        novel_id: Uuid,
        module_id: Uuid,
        title: String,
    },
    /// 一轮解锁的汇总
    ContentUnlocked {
        novel_id: Uuid,
        count: usize,
        final_budget: i64,
    },
    /// 收到贡献
    ContributionReceived {
        novel_id: Uuid,
        user_id: Uuid,
        amount: i64,
        budget: i64,
        balance: i64,
    },
    /// 收到礼物
    GiftReceived {
        novel_id: Uuid,
        user_id: Uuid,
        amount: i64,
        balance: i64,
    },
}

impl FundingEvent {
    pub fn name(&self) -> &'static str {
        match self {
            FundingEvent::ModuleUnlocked { .. } => "ModuleUnlocked",
            FundingEvent::ChapterUnlocked { .. } => "ChapterUnlocked",
            FundingEvent::ModuleSwitched { .. } => "ModuleSwitched",
            FundingEvent::ContentUnlocked { .. } => "ContentUnlocked",
            FundingEvent::ContributionReceived { .. } => "ContributionReceived",
            FundingEvent::GiftReceived { .. } => "GiftReceived",
        }
    }
}

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<FundingEvent>,
}

impl EventPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅所有资金事件
    pub fn subscribe(&self) -> broadcast::Receiver<FundingEvent> {
        self.channel.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.channel.receiver_count()
    }

    /// 发布一轮解锁的结果：每个解锁项一个事件，再加一个汇总事件
    pub fn publish_unlock_outcome(&self, outcome: &UnlockOutcome) {
        let novel_id = outcome.novel_id;
        for content in &outcome.unlocked_content {
            let event = match content.kind {
                ContentKind::Module => FundingEvent::ModuleUnlocked {
                    novel_id,
                    module_id: content.id,
                    title: content.title.clone(),
                    price: content.price,
                    budget_after: content.budget_after,
                },
                ContentKind::Chapter => FundingEvent::ChapterUnlocked {
                    novel_id,
                    module_id: content.module_id,
                    chapter_id: content.id,
                    title: content.title.clone(),
                    price: content.price,
                    budget_after: content.budget_after,
                },
            };
            self.publish(event);
        }

        for module in &outcome.switched_modules {
            self.publish(FundingEvent::ModuleSwitched {
                novel_id,
                module_id: module.id,
                title: module.title.clone(),
            });
        }

        if !outcome.unlocked_content.is_empty() {
            self.publish(FundingEvent::ContentUnlocked {
                novel_id,
                count: outcome.unlocked_content.len(),
                final_budget: outcome.final_budget,
            });
        }
    }

    /// 发布贡献入账事件
    pub fn publish_contribution(
        &self,
        novel_id: Uuid,
        user_id: Uuid,
        amount: i64,
        budget: i64,
        balance: i64,
    ) {
        self.publish(FundingEvent::ContributionReceived {
            novel_id,
            user_id,
            amount,
            budget,
            balance,
        });
    }

    /// 发布礼物入账事件
    pub fn publish_gift(&self, novel_id: Uuid, user_id: Uuid, amount: i64, balance: i64) {
        self.publish(FundingEvent::GiftReceived {
            novel_id,
            user_id,
            amount,
            balance,
        });
    }

    fn publish(&self, event: FundingEvent) {
        let name = event.name();
        if let Err(e) = self.channel.send(event) {
            tracing::debug!(
                event = name,
                error = %e,
                "Failed to publish event (no receivers)"
            );
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::engine::{SwitchedModule, UnlockedContent};

    fn outcome() -> UnlockOutcome {
        let novel_id = Uuid::new_v4();
        let module_id = Uuid::new_v4();
        UnlockOutcome {
            novel_id,
            unlocked_content: vec![
                UnlockedContent {
                    kind: ContentKind::Module,
                    id: module_id,
                    module_id,
                    title: "Module A".to_string(),
                    order: 1,
                    price: 100,
                    budget_after: 50,
                },
                UnlockedContent {
                    kind: ContentKind::Chapter,
                    id: Uuid::new_v4(),
                    module_id,
                    title: "Chapter A1".to_string(),
                    order: 1,
                    price: 30,
                    budget_after: 20,
                },
            ],
            final_budget: 20,
            switched_modules: vec![SwitchedModule {
                id: Uuid::new_v4(),
                title: "Rent".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_unlock_outcome_fans_out() {
        let publisher = EventPublisher::new(16);
        let mut rx = publisher.subscribe();

        publisher.publish_unlock_outcome(&outcome());

        let names: Vec<&'static str> = (0..4).map(|_| rx.try_recv().unwrap().name()).collect();
        assert_eq!(
            names,
            vec![
                "ModuleUnlocked",
                "ChapterUnlocked",
                "ModuleSwitched",
                "ContentUnlocked"
            ]
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let publisher = EventPublisher::new(4);
        publisher.publish_gift(Uuid::new_v4(), Uuid::new_v4(), 5, 5);
        assert_eq!(publisher.subscriber_count(), 0);
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = FundingEvent::ContentUnlocked {
            novel_id: Uuid::nil(),
            count: 2,
            final_budget: 20,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "ContentUnlocked");
        assert_eq!(json["data"]["count"], 2);
    }

    #[test]
    fn test_empty_outcome_publishes_nothing() {
        let publisher = EventPublisher::new(4);
        let mut rx = publisher.subscribe();
        publisher.publish_unlock_outcome(&UnlockOutcome {
            novel_id: Uuid::new_v4(),
            unlocked_content: Vec::new(),
            final_budget: 0,
            switched_modules: Vec::new(),
        });
        assert!(rx.try_recv().is_err());
    }
}
