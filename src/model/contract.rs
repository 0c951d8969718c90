use serde::{Deserialize, Serialize};

use crate::model::status::StatusId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Contract {
    pub id: u64,
    pub employee_id: u64,
    pub status_id: StatusId,
}
