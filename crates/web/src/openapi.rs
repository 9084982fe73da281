use utoipa::OpenApi;

use crate::features;

#[derive(OpenApi)]
#[openapi(
    paths(
        features::persons::handlers::register_person,
        features::persons::handlers::get_person_by_badge,
        features::persons::handlers::self_edit_person,
        features::persons::handlers::list_persons,
        features::persons::handlers::update_person,
        features::persons::handlers::delete_person,
        features::scan::handlers::scan,
        features::scan::handlers::scan_batch,
        features::teams::handlers::list_teams,
        features::teams::handlers::create_team,
        features::teams::handlers::rename_team,
        features::teams::handlers::delete_team,
        features::scores::handlers::adjust_team_score,
        features::scores::handlers::list_scores,
        features::scores::handlers::delete_score,
        features::scores::handlers::recalculate_scores,
        features::scores::handlers::reset_scores,
        features::logbooks::handlers::list_entries,
        features::logbooks::handlers::list_open_sessions,
        features::scoreboard::handlers::get_scoreboard,
        features::scoreboard::handlers::update_settings,
        features::scoreboard::handlers::start_reveal,
        features::scoreboard::handlers::tick_reveal,
        features::scoreboard::handlers::set_countdown,
        features::scoreboard::handlers::announce_winner,
        features::scoreboard::handlers::reset_reveal,
        features::audit::handlers::list_audit,
        features::changes::handlers::stream_changes,
    ),
    components(
        schemas(
            storage::dto::person::RegisterPersonRequest,
            storage::dto::person::UpdatePersonRequest,
            storage::dto::person::PersonResponse,
            storage::dto::scan::ScanMode,
            storage::dto::scan::ScanStatus,
            storage::dto::scan::ScanRequest,
            storage::dto::scan::ScanResponse,
            storage::dto::scan::BatchScanRequest,
            storage::dto::scan::BatchScanStatus,
            storage::dto::scan::BatchScanResult,
            storage::dto::scan::BatchScanResponse,
            storage::dto::team::CreateTeamRequest,
            storage::dto::team::RenameTeamRequest,
            storage::dto::team::TeamResponse,
            storage::dto::score::ApplyDeltaRequest,
            storage::dto::score::ScoreAdjustmentResponse,
            storage::dto::score::DeleteScoreResponse,
            storage::dto::score::RecalculateResponse,
            storage::dto::score::ResetResponse,
            storage::dto::scoreboard::UpdateSettingsRequest,
            storage::dto::scoreboard::StartRevealRequest,
            storage::dto::scoreboard::SetCountdownRequest,
            storage::dto::scoreboard::BoardRow,
            storage::dto::scoreboard::WinnerInfo,
            storage::dto::scoreboard::ScoreboardView,
            storage::dto::common::PaginationMeta,
            storage::changes::ChangeEvent,
            storage::changes::ChangeTable,
            storage::changes::ChangeKind,
            storage::models::Role,
            storage::models::Logbook,
            storage::models::LogbookEntry,
            storage::models::Team,
            storage::models::ScoreLogEntry,
            storage::models::AuditAction,
            storage::models::AuditLogEntry,
            storage::models::RevealState,
            storage::models::ScoreboardSettings,
        )
    ),
    tags(
        (name = "persons", description = "Registration and profiles"),
        (name = "attendance", description = "Badge scans and logbooks"),
        (name = "teams", description = "Teams and standings"),
        (name = "scores", description = "Merits, demerits and reconciliation"),
        (name = "scoreboard", description = "Public board and reveal sequence"),
        (name = "audit", description = "Administrative audit trail"),
        (name = "changes", description = "Live change notifications"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}
