use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use interclub_app::workflow::{
    fixtures::{
        complete::CompleteFixtureError, generate::GenerateFixturesError,
        list::ListFixturesError, selection_override::SetSelectionOverrideError,
    },
    pairings::{
        generate::GeneratePairingsError, list::ListPairingsError,
        record_result::RecordMatchResultError,
    },
    selection::{
        acknowledge_scratch::AcknowledgeScratchNoticeError, lock::GetSelectionLockError,
        scratch::SubmitScratchNoticeError, submit::SubmitSelectionError,
    },
    standings::{compute::ComputeStandingsError, finals::GenerateFinalsError},
};
use serde_json::json;

/// A failed request, rendered as `{ "error": message }`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: String) -> Self {
        Self { status, message }
    }

    pub fn bad_request(message: String) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn from_error(status: StatusCode, error: &dyn std::error::Error) -> Self {
        if status.is_server_error() {
            log::error!("Request failed: {}", error);
        }
        Self::new(status, error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.message }));
        (status, body).into_response()
    }
}

impl From<GenerateFixturesError> for ApiError {
    fn from(value: GenerateFixturesError) -> Self {
        let status = match &value {
            GenerateFixturesError::Forbidden => StatusCode::FORBIDDEN,
            GenerateFixturesError::NotEnoughTeams { .. }
            | GenerateFixturesError::InvalidConfiguration(_) => StatusCode::BAD_REQUEST,
            GenerateFixturesError::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::from_error(status, &value)
    }
}

impl From<ListFixturesError> for ApiError {
    fn from(value: ListFixturesError) -> Self {
        Self::from_error(StatusCode::INTERNAL_SERVER_ERROR, &value)
    }
}

impl From<SetSelectionOverrideError> for ApiError {
    fn from(value: SetSelectionOverrideError) -> Self {
        let status = match &value {
            SetSelectionOverrideError::Forbidden => StatusCode::FORBIDDEN,
            SetSelectionOverrideError::FixtureNotFound(_) => StatusCode::NOT_FOUND,
            SetSelectionOverrideError::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::from_error(status, &value)
    }
}

impl From<CompleteFixtureError> for ApiError {
    fn from(value: CompleteFixtureError) -> Self {
        let status = match &value {
            CompleteFixtureError::Forbidden => StatusCode::FORBIDDEN,
            CompleteFixtureError::FixtureNotFound(_) => StatusCode::NOT_FOUND,
            CompleteFixtureError::AlreadyCompleted(_)
            | CompleteFixtureError::NotPaired(_)
            | CompleteFixtureError::PendingMatches { .. } => StatusCode::CONFLICT,
            CompleteFixtureError::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::from_error(status, &value)
    }
}

impl From<GeneratePairingsError> for ApiError {
    fn from(value: GeneratePairingsError) -> Self {
        let status = match &value {
            GeneratePairingsError::FixtureNotFound(_) => StatusCode::NOT_FOUND,
            GeneratePairingsError::FixtureCompleted(_) => StatusCode::CONFLICT,
            GeneratePairingsError::UnknownPlayer(_)
            | GeneratePairingsError::InvalidSelection(_) => StatusCode::BAD_REQUEST,
            GeneratePairingsError::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::from_error(status, &value)
    }
}

impl From<ListPairingsError> for ApiError {
    fn from(value: ListPairingsError) -> Self {
        let status = match &value {
            ListPairingsError::FixtureNotFound(_) => StatusCode::NOT_FOUND,
            ListPairingsError::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::from_error(status, &value)
    }
}

impl From<RecordMatchResultError> for ApiError {
    fn from(value: RecordMatchResultError) -> Self {
        let status = match &value {
            RecordMatchResultError::Forbidden => StatusCode::FORBIDDEN,
            RecordMatchResultError::FixtureNotFound(_)
            | RecordMatchResultError::SlotNotFound { .. } => StatusCode::NOT_FOUND,
            RecordMatchResultError::FixtureCompleted(_) | RecordMatchResultError::Refused(_) => {
                StatusCode::CONFLICT
            }
            RecordMatchResultError::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::from_error(status, &value)
    }
}

impl From<SubmitSelectionError> for ApiError {
    fn from(value: SubmitSelectionError) -> Self {
        let status = match &value {
            SubmitSelectionError::Forbidden(_) | SubmitSelectionError::Locked { .. } => {
                StatusCode::FORBIDDEN
            }
            SubmitSelectionError::FixtureNotFound(_) | SubmitSelectionError::TeamNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            SubmitSelectionError::TeamNotInFixture { .. }
            | SubmitSelectionError::InvalidSelection(_)
            | SubmitSelectionError::UnknownPlayer(_)
            | SubmitSelectionError::PlayerNotInClub { .. } => StatusCode::BAD_REQUEST,
            SubmitSelectionError::FixtureCompleted(_) => StatusCode::CONFLICT,
            SubmitSelectionError::Pairings(_) | SubmitSelectionError::StorageError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::from_error(status, &value)
    }
}

impl From<GetSelectionLockError> for ApiError {
    fn from(value: GetSelectionLockError) -> Self {
        let status = match &value {
            GetSelectionLockError::Forbidden(_) => StatusCode::FORBIDDEN,
            GetSelectionLockError::FixtureNotFound(_) => StatusCode::NOT_FOUND,
            GetSelectionLockError::TeamNotInFixture { .. } => StatusCode::BAD_REQUEST,
            GetSelectionLockError::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::from_error(status, &value)
    }
}

impl From<SubmitScratchNoticeError> for ApiError {
    fn from(value: SubmitScratchNoticeError) -> Self {
        let status = match &value {
            SubmitScratchNoticeError::Forbidden(_) => StatusCode::FORBIDDEN,
            SubmitScratchNoticeError::EmptyMessage
            | SubmitScratchNoticeError::MessageTooLong { .. }
            | SubmitScratchNoticeError::TeamNotInFixture { .. } => StatusCode::BAD_REQUEST,
            SubmitScratchNoticeError::FixtureNotFound(_) => StatusCode::NOT_FOUND,
            SubmitScratchNoticeError::FixtureCompleted(_) => StatusCode::CONFLICT,
            SubmitScratchNoticeError::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::from_error(status, &value)
    }
}

impl From<AcknowledgeScratchNoticeError> for ApiError {
    fn from(value: AcknowledgeScratchNoticeError) -> Self {
        let status = match &value {
            AcknowledgeScratchNoticeError::Forbidden => StatusCode::FORBIDDEN,
            AcknowledgeScratchNoticeError::NoticeNotFound { .. } => StatusCode::NOT_FOUND,
            AcknowledgeScratchNoticeError::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::from_error(status, &value)
    }
}

impl From<ComputeStandingsError> for ApiError {
    fn from(value: ComputeStandingsError) -> Self {
        Self::from_error(StatusCode::INTERNAL_SERVER_ERROR, &value)
    }
}

impl From<GenerateFinalsError> for ApiError {
    fn from(value: GenerateFinalsError) -> Self {
        let status = match &value {
            GenerateFinalsError::Forbidden => StatusCode::FORBIDDEN,
            GenerateFinalsError::NotSeedable(_) => StatusCode::BAD_REQUEST,
            GenerateFinalsError::AlreadyGenerated(_) => StatusCode::CONFLICT,
            GenerateFinalsError::StorageError => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::from_error(status, &value)
    }
}
