use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};

/// Local hour at which selections close.
pub const DEADLINE_HOUR: i64 = 17;

#[derive(Clone, Debug, PartialEq)]
pub struct LockContext {
    pub match_date: NaiveDate,
    pub override_until: Option<DateTime<Utc>>,
    pub exception_acknowledged: bool,
    pub is_platform_admin: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverrideSource {
    Administrator,
    AdminOverride { until: DateTime<Utc> },
    ScratchException,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionLockState {
    Open { deadline: DateTime<Utc> },
    Locked { deadline: DateTime<Utc> },
    OverrideOpen(OverrideSource),
}

impl SelectionLockState {
    pub fn allows_edits(&self) -> bool {
        !matches!(self, SelectionLockState::Locked { .. })
    }
}

/// Days between the selection deadline and a match played on the given
/// weekday, counted from Sunday = 0.
fn deadline_offset_days(weekday_from_sunday: u32) -> u64 {
    match weekday_from_sunday {
        0 => 2,
        6 => 1,
        weekday => weekday as u64 + 2,
    }
}

/// Selections for a match close at 17:00 local time on the Friday before it.
/// Weekend matches close on the Friday of the same weekend.
pub fn selection_deadline<Tz: TimeZone>(match_date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let offset = deadline_offset_days(match_date.weekday().num_days_from_sunday());
    let day = match_date - Days::new(offset);
    let local = day.and_time(NaiveTime::MIN) + TimeDelta::hours(DEADLINE_HOUR);

    tz.from_local_datetime(&local)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&local))
}

/// Whether a team may still edit its selection for a fixture at `now`.
pub fn selection_lock_state<Tz: TimeZone>(
    now: DateTime<Utc>,
    context: &LockContext,
    tz: &Tz,
) -> SelectionLockState {
    let deadline = selection_deadline(context.match_date, tz).with_timezone(&Utc);
    if now < deadline {
        return SelectionLockState::Open { deadline };
    }

    if context.is_platform_admin {
        return SelectionLockState::OverrideOpen(OverrideSource::Administrator);
    }
    if let Some(until) = context.override_until
        && now < until
    {
        return SelectionLockState::OverrideOpen(OverrideSource::AdminOverride { until });
    }
    if context.exception_acknowledged {
        return SelectionLockState::OverrideOpen(OverrideSource::ScratchException);
    }

    SelectionLockState::Locked { deadline }
}
