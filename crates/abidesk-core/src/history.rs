//! Deployment history: the record type and the storage capability trait.
//! Concrete stores live in `abidesk-history`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::args::ConstructorArg;
use crate::error::HistoryError;

/// One recorded contract deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRecord {
    /// Unique id; UUID v4 when created through [`DeploymentRecord::new`].
    pub id: String,
    pub contract_name: String,
    /// Deployed contract address.
    pub address: String,
    /// Network slug, e.g. "sepolia".
    pub network: String,
    pub transaction_hash: String,
    /// The full ABI JSON the contract was deployed with.
    pub abi_json: String,
    /// Constructor arguments as supplied at deploy time.
    pub constructor_args: Vec<ConstructorArg>,
    pub deployed_at: DateTime<Utc>,
}

impl DeploymentRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        contract_name: impl Into<String>,
        address: impl Into<String>,
        network: impl Into<String>,
        transaction_hash: impl Into<String>,
        abi_json: impl Into<String>,
        constructor_args: Vec<ConstructorArg>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            contract_name: contract_name.into(),
            address: address.into(),
            network: network.into(),
            transaction_hash: transaction_hash.into(),
            abi_json: abi_json.into(),
            constructor_args,
            deployed_at: Utc::now(),
        }
    }
}

/// Append/lookup-only deployment storage, keyed by `DeploymentRecord::id`.
pub trait HistoryStore: Send + Sync {
    /// Record a deployment. Duplicate ids are rejected with
    /// [`HistoryError::AlreadyExists`]; existing entries are never mutated.
    fn save(&self, entry: DeploymentRecord) -> Result<(), HistoryError>;

    /// Look up a deployment by id.
    fn get(&self, id: &str) -> Result<Option<DeploymentRecord>, HistoryError>;

    /// All deployments in insertion order.
    fn all(&self) -> Result<Vec<DeploymentRecord>, HistoryError>;
}
