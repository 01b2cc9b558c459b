//! Group availability aggregation.
//!
//! Pulls busy intervals from every member of a group, tolerating
//! per-member failure, and computes the shared free slots. A partial
//! result is a success: members whose availability could not be
//! determined are reported in `missing_members` instead of failing the
//! whole call.

use futures_util::StreamExt;
use tracing::{info, warn};

use slotsync_core::{Interval, TimeWindow, free_slots, merge_busy};
use slotsync_google::{CalendarClient, GoogleConfig};

use crate::credentials::{TokenFlow, TokenFlowError};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// The shared availability view for one group and window.
#[derive(Debug, Clone)]
pub struct GroupAvailability {
    /// The queried window.
    pub window: TimeWindow,
    /// Free slots common to every reachable member, capped in length.
    pub free_slots: Vec<Interval>,
    /// Members whose availability could not be determined.
    pub missing_members: Vec<String>,
}

/// Computes the group's shared free slots within `window`.
///
/// Fails before any external call when the group does not exist or the
/// caller is not a listed member. Per-member fetches run concurrently with
/// bounded parallelism; a member's failure never aborts the others.
pub async fn group_free_busy(
    state: &AppState,
    group_id: &str,
    caller_uid: &str,
    window: TimeWindow,
) -> ApiResult<GroupAvailability> {
    let group = state
        .groups
        .load(group_id)
        .await?
        .ok_or_else(|| ApiError::not_found("group does not exist"))?;

    if !group.is_member(caller_uid) {
        return Err(ApiError::forbidden("caller is not a member of this group"));
    }

    let member_ids = group.member_ids();
    let member_count = member_ids.len();
    let flow = state.token_flow();

    let results: Vec<(String, Result<Vec<Interval>, TokenFlowError>)> =
        futures_util::stream::iter(member_ids)
            .map(|uid| {
                let flow = flow.clone();
                let google = state.google.clone();
                async move {
                    let busy = member_busy(&flow, &google, &uid, &window).await;
                    (uid, busy)
                }
            })
            .buffer_unordered(state.config.member_concurrency)
            .collect()
            .await;

    let mut combined = Vec::new();
    let mut missing_members = Vec::new();
    for (uid, result) in results {
        match result {
            Ok(busy) => combined.extend(busy),
            Err(err) => {
                warn!(uid = %uid, error = %err, "member availability unavailable");
                missing_members.push(uid);
            }
        }
    }
    missing_members.sort();

    let merged = merge_busy(&combined, &window);
    let mut slots = free_slots(&window, &merged);
    slots.truncate(state.config.max_free_slots);

    info!(
        group_id,
        members = member_count,
        missing = missing_members.len(),
        slots = slots.len(),
        "computed group availability"
    );

    Ok(GroupAvailability {
        window,
        free_slots: slots,
        missing_members,
    })
}

/// Fetches one member's busy intervals under the refresh-and-retry policy.
async fn member_busy(
    flow: &TokenFlow,
    google: &GoogleConfig,
    uid: &str,
    window: &TimeWindow,
) -> Result<Vec<Interval>, TokenFlowError> {
    flow.with_token(uid, move |access| async move {
        CalendarClient::new(&google.api_base, access, google.timeout)
            .fetch_busy(window)
            .await
    })
    .await
}
