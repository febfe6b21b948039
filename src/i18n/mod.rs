//! 多语言错误消息模块
//!
//! 使用rat_embed_lang框架提供统一的错误消息多语言支持

use std::collections::HashMap;
use rat_embed_lang::register_translations;

/// 错误消息翻译注册器
pub struct ErrorMessageI18n;

impl ErrorMessageI18n {
    fn entry(zh: &str, en: &str, ja: &str) -> HashMap<String, String> {
        let mut messages = HashMap::new();
        messages.insert("zh-CN".to_string(), zh.to_string());
        messages.insert("en-US".to_string(), en.to_string());
        messages.insert("ja-JP".to_string(), ja.to_string());
        messages
    }

    /// 注册所有错误消息翻译
    pub fn register_all_translations() {
        let mut translations = HashMap::new();

        // SQLite内存数据库连接失败
        translations.insert(
            "error.sqlite_memory".to_string(),
            Self::entry(
                "SQLite内存数据库连接失败: {message}",
                "SQLite in-memory database connection failed: {message}",
                "SQLiteインメモリデータベース接続失敗: {message}",
            ),
        );

        // SQLite数据库文件不存在
        translations.insert(
            "error.sqlite_file_not_found".to_string(),
            Self::entry(
                "SQLite数据库文件不存在且未启用自动创建: {path}",
                "SQLite database file does not exist and auto-create is not enabled: {path}",
                "SQLiteデータベースファイルが存在せず、自動作成が有効ではありません: {path}",
            ),
        );

        // 创建SQLite数据库目录失败
        translations.insert(
            "error.sqlite_dir_create_failed".to_string(),
            Self::entry(
                "创建SQLite数据库目录失败: {message}",
                "Failed to create SQLite database directory: {message}",
                "SQLiteデータベースディレクトリの作成に失敗しました: {message}",
            ),
        );

        // SQLite连接失败
        translations.insert(
            "error.sqlite_connection_failed".to_string(),
            Self::entry(
                "SQLite连接失败: {message}",
                "SQLite connection failed: {message}",
                "SQLite接続失敗: {message}",
            ),
        );

        // 数据库URL无法解析
        translations.insert(
            "error.invalid_db_url".to_string(),
            Self::entry(
                "无法解析数据库URL: {url}",
                "Unable to parse database URL: {url}",
                "データベースURLを解析できません: {url}",
            ),
        );

        // 模型翻译被跳过
        translations.insert(
            "error.model_skipped".to_string(),
            Self::entry(
                "模型 {model} 翻译失败，已跳过: {reason}",
                "Model {model} failed to translate and was skipped: {reason}",
                "モデル {model} の変換に失敗したためスキップしました: {reason}",
            ),
        );

        // 同步桥接重入失败
        translations.insert(
            "error.reentrant_blocking".to_string(),
            Self::entry(
                "当前运行时为单线程调度，不允许阻塞重入",
                "The current runtime is single-threaded and does not allow blocking re-entry",
                "現在のランタイムはシングルスレッドのため、ブロッキング再入は許可されていません",
            ),
        );

        // 启动失败
        translations.insert(
            "error.lifespan_startup".to_string(),
            Self::entry(
                "启动阶段激活失败: {message}",
                "Activation failed during startup: {message}",
                "起動時のアクティベーションに失敗しました: {message}",
            ),
        );

        // 注册所有翻译
        register_translations(translations);
    }

    /// 初始化错误消息多语言支持
    pub fn init() {
        Self::register_all_translations();

        // 从环境变量获取语言设置，默认为zh-CN
        let lang = std::env::var("RAT_LANG")
            .or_else(|_| std::env::var("LANG"))
            .unwrap_or_else(|_| "zh-CN".to_string());

        // 标准化语言代码
        use rat_embed_lang::normalize_language_code;
        let normalized_lang = normalize_language_code(&lang);
        set_language(&normalized_lang);
    }
}

/// 重新导出rat_embed_lang的核心函数
pub use rat_embed_lang::{t, tf, set_language, current_language};
