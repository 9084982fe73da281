use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LogbookFilter {
    /// Only this person's sessions
    pub person_id: Option<Uuid>,
}
