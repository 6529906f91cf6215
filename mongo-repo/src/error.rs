use mongodb::bson;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error("failed to connect to `{dsn}`")]
    Connect {
        dsn: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error(transparent)]
    Serialize(#[from] bson::ser::Error),

    #[error(transparent)]
    Deserialize(#[from] bson::de::Error),

    #[error("can not insert a record into `{table}`")]
    NotInserted { table: String },

    #[error("record has no `{pk}` field")]
    MissingKey { pk: String },

    #[error("duplicate key `{key}`")]
    DuplicateKey { key: String },

    #[error("operator `{operator}` is not supported by this store")]
    UnsupportedOperator { operator: String },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
