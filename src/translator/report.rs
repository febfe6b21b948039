//! 翻译报告
//!
//! 每个源模型对应一条结果：翻译成功，或者带原因被跳过

use rat_logger::{info, warn};
use serde::{Deserialize, Serialize};

/// 单个模型的翻译结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TranslationOutcome {
    Translated { name: String },
    Skipped { name: String, reason: String },
}

impl TranslationOutcome {
    pub fn name(&self) -> &str {
        match self {
            TranslationOutcome::Translated { name } | TranslationOutcome::Skipped { name, .. } => name,
        }
    }

    pub fn is_translated(&self) -> bool {
        matches!(self, TranslationOutcome::Translated { .. })
    }
}

/// 一次批量翻译的报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationReport {
    outcomes: Vec<TranslationOutcome>,
}

impl TranslationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加结果，目录中的每个源模型各占一条
    pub fn push(&mut self, outcome: TranslationOutcome) {
        self.outcomes.push(outcome);
    }

    /// 把已翻译的模型改记为跳过（模式构建阶段排除的模型）
    ///
    /// 注册表按名称存放，同名的所有成功结果一起改记
    pub fn exclude(&mut self, name: &str, reason: &str) {
        let mut found = false;
        for outcome in self.outcomes.iter_mut().filter(|o| o.name() == name) {
            if outcome.is_translated() {
                *outcome = TranslationOutcome::Skipped {
                    name: name.to_string(),
                    reason: reason.to_string(),
                };
                found = true;
            }
        }
        if !found {
            self.push(TranslationOutcome::Skipped {
                name: name.to_string(),
                reason: reason.to_string(),
            });
        }
    }

    pub fn outcomes(&self) -> &[TranslationOutcome] {
        &self.outcomes
    }

    pub fn translated(&self) -> impl Iterator<Item = &str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_translated())
            .map(TranslationOutcome::name)
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|o| match o {
            TranslationOutcome::Skipped { name, reason } => Some((name.as_str(), reason.as_str())),
            _ => None,
        })
    }

    pub fn is_translated(&self, name: &str) -> bool {
        self.outcomes.iter().any(|o| o.is_translated() && o.name() == name)
    }

    pub fn skipped_reason(&self, name: &str) -> Option<&str> {
        self.skipped().find(|(n, _)| *n == name).map(|(_, reason)| reason)
    }

    /// 输出日志：成功为 info，跳过为 warn
    pub fn log(&self) {
        for outcome in &self.outcomes {
            match outcome {
                TranslationOutcome::Translated { name } => info!("✅ 模型 {} 翻译成功", name),
                TranslationOutcome::Skipped { name, reason } => warn!(
                    "⚠️ {}",
                    crate::i18n::tf("error.model_skipped", &[("model", name), ("reason", reason)])
                ),
            }
        }
        info!(
            "翻译完成: 成功 {} 个，跳过 {} 个",
            self.translated().count(),
            self.skipped().count()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exclude_replaces_success() {
        let mut report = TranslationReport::new();
        report.push(TranslationOutcome::Translated { name: "Choice".into() });
        report.push(TranslationOutcome::Translated { name: "Question".into() });
        report.exclude("Choice", "引用了未注册的模型 Poll");

        assert!(!report.is_translated("Choice"));
        assert_eq!(report.skipped_reason("Choice"), Some("引用了未注册的模型 Poll"));
        assert_eq!(report.translated().collect::<Vec<_>>(), vec!["Question"]);
        assert_eq!(report.outcomes().len(), 2);
    }

    #[test]
    fn test_failed_duplicate_keeps_earlier_success() {
        let mut report = TranslationReport::new();
        report.push(TranslationOutcome::Translated { name: "Question".into() });
        report.push(TranslationOutcome::Skipped {
            name: "Question".into(),
            reason: "关系目标无法解析".into(),
        });

        assert!(report.is_translated("Question"));
        assert!(report.outcomes()[0].is_translated());
        assert!(!report.outcomes()[1].is_translated());
    }
}
