use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// CSV dataset the catalog store is built from. Missing file is fatal at startup.
    pub dataset_path: PathBuf,
    /// Directory holding the model artifacts. Missing artifacts are not fatal;
    /// the prediction pipeline degrades instead.
    pub model_dir: PathBuf,
}

impl AppConfig {
    #[must_use]
    pub fn embedding_path(&self) -> PathBuf {
        self.model_dir.join("fasttext_embeddings.json")
    }

    #[must_use]
    pub fn classifier_path(&self) -> PathBuf {
        self.model_dir.join("classifier.json")
    }

    #[must_use]
    pub fn vectorizer_path(&self) -> PathBuf {
        self.model_dir.join("tfidf_vectorizer.json")
    }
}
