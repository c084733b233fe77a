use std::sync::Arc;

use chrono_tz::Tz;

use crate::{
    domain::{
        fixture::FixtureRepository,
        selection::{ScratchNoticeRepository, SelectionRepository},
    },
    ports::{directory::PlayerDirectoryPort, season::SeasonConfigurationPort},
    workflow::{
        fixtures::{
            complete::{CompleteFixtureUseCase, CompleteFixtureUseCaseImpl},
            generate::{GenerateFixturesUseCase, GenerateFixturesUseCaseImpl},
            list::{ListFixturesUseCase, ListFixturesUseCaseImpl},
            selection_override::{SetSelectionOverrideUseCase, SetSelectionOverrideUseCaseImpl},
        },
        pairings::{
            generate::{GeneratePairingsUseCase, GeneratePairingsUseCaseImpl},
            list::{ListPairingsUseCase, ListPairingsUseCaseImpl},
            record_result::{RecordMatchResultUseCase, RecordMatchResultUseCaseImpl},
        },
        selection::{
            acknowledge_scratch::{
                AcknowledgeScratchNoticeUseCase, AcknowledgeScratchNoticeUseCaseImpl,
            },
            lock::{GetSelectionLockUseCase, GetSelectionLockUseCaseImpl},
            scratch::{SubmitScratchNoticeUseCase, SubmitScratchNoticeUseCaseImpl},
            submit::{SubmitSelectionUseCase, SubmitSelectionUseCaseImpl},
        },
        standings::{
            compute::{ComputeStandingsUseCase, ComputeStandingsUseCaseImpl},
            finals::{GenerateFinalsUseCase, GenerateFinalsUseCaseImpl},
        },
    },
};

pub mod domain;
pub mod memory;
pub mod ports;
pub mod workflow;

pub struct Application {
    pub fixtures_generate_use_case: Box<dyn GenerateFixturesUseCase + Send + Sync + 'static>,
    pub fixtures_list_use_case: Box<dyn ListFixturesUseCase + Send + Sync + 'static>,
    pub fixtures_complete_use_case: Box<dyn CompleteFixtureUseCase + Send + Sync + 'static>,
    pub selection_override_use_case: Box<dyn SetSelectionOverrideUseCase + Send + Sync + 'static>,

    pub pairings_generate_use_case: Arc<dyn GeneratePairingsUseCase + Send + Sync + 'static>,
    pub pairings_list_use_case: Box<dyn ListPairingsUseCase + Send + Sync + 'static>,
    pub match_result_use_case: Box<dyn RecordMatchResultUseCase + Send + Sync + 'static>,

    pub selection_submit_use_case: Box<dyn SubmitSelectionUseCase + Send + Sync + 'static>,
    pub selection_lock_use_case: Arc<dyn GetSelectionLockUseCase + Send + Sync + 'static>,
    pub scratch_submit_use_case: Box<dyn SubmitScratchNoticeUseCase + Send + Sync + 'static>,
    pub scratch_acknowledge_use_case:
        Box<dyn AcknowledgeScratchNoticeUseCase + Send + Sync + 'static>,

    pub standings_use_case: Arc<dyn ComputeStandingsUseCase + Send + Sync + 'static>,
    pub finals_generate_use_case: Box<dyn GenerateFinalsUseCase + Send + Sync + 'static>,
}

pub fn build_application<
    C: SeasonConfigurationPort + Send + Sync + 'static,
    P: PlayerDirectoryPort + Send + Sync + 'static,
    F: FixtureRepository + Send + Sync + 'static,
    S: SelectionRepository + Send + Sync + 'static,
    N: ScratchNoticeRepository + Send + Sync + 'static,
>(
    season_port: Arc<C>,
    player_directory: Arc<P>,
    fixture_repository: Arc<F>,
    selection_repository: Arc<S>,
    notice_repository: Arc<N>,
    time_zone: Tz,
) -> Application {
    let pairings_generate_use_case = Arc::new(GeneratePairingsUseCaseImpl::new(
        fixture_repository.clone(),
        selection_repository.clone(),
        player_directory.clone(),
    ));
    let selection_lock_use_case = Arc::new(GetSelectionLockUseCaseImpl::new(
        fixture_repository.clone(),
        notice_repository.clone(),
        time_zone,
    ));
    let standings_use_case = Arc::new(ComputeStandingsUseCaseImpl::new(
        season_port.clone(),
        fixture_repository.clone(),
    ));

    Application {
        fixtures_generate_use_case: Box::new(GenerateFixturesUseCaseImpl::new(
            season_port.clone(),
            fixture_repository.clone(),
        )),
        fixtures_list_use_case: Box::new(ListFixturesUseCaseImpl::new(fixture_repository.clone())),
        fixtures_complete_use_case: Box::new(CompleteFixtureUseCaseImpl::new(
            fixture_repository.clone(),
        )),
        selection_override_use_case: Box::new(SetSelectionOverrideUseCaseImpl::new(
            fixture_repository.clone(),
        )),

        pairings_generate_use_case: pairings_generate_use_case.clone(),
        pairings_list_use_case: Box::new(ListPairingsUseCaseImpl::new(fixture_repository.clone())),
        match_result_use_case: Box::new(RecordMatchResultUseCaseImpl::new(
            fixture_repository.clone(),
        )),

        selection_submit_use_case: Box::new(SubmitSelectionUseCaseImpl::new(
            fixture_repository.clone(),
            selection_repository.clone(),
            season_port.clone(),
            player_directory.clone(),
            selection_lock_use_case.clone(),
            pairings_generate_use_case.clone(),
        )),
        selection_lock_use_case: selection_lock_use_case.clone(),
        scratch_submit_use_case: Box::new(SubmitScratchNoticeUseCaseImpl::new(
            fixture_repository.clone(),
            notice_repository.clone(),
        )),
        scratch_acknowledge_use_case: Box::new(AcknowledgeScratchNoticeUseCaseImpl::new(
            notice_repository.clone(),
        )),

        standings_use_case: standings_use_case.clone(),
        finals_generate_use_case: Box::new(GenerateFinalsUseCaseImpl::new(
            standings_use_case.clone(),
            fixture_repository.clone(),
        )),
    }
}
