//! Stateless session commands: creation, question selection, answer
//! grading, and lifelines.
//!
//! Every mutation reads `(session, version)` from the store, computes the
//! next state, and commits through the conditional write. A losing writer
//! gets `ConcurrentModification` and is expected to re-read and retry;
//! nothing here holds a lock.

use std::collections::HashSet;
use std::time::SystemTime;

use rand::seq::IndexedRandom;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dao::session_store::VersionedSession,
    dto::session::{
        AnswerOutcome, CreateSessionRequest, LifelineOutcome, SelectQuestionRequest,
        SessionSummary, SubmitAnswerRequest,
    },
    error::EngineError,
    model::{
        GameSession, LifelineKind, PlayerAnswer, Question, SessionPlayer, SessionStatus,
    },
    services::{
        access::{self, Actor},
        rollup_service,
    },
    state::SharedState,
};

/// Validate creation input, snapshot the participants, and persist a fresh
/// session in the Waiting state.
pub async fn create_session(
    state: &SharedState,
    request: CreateSessionRequest,
) -> Result<SessionSummary, EngineError> {
    let CreateSessionRequest {
        player_id: created_by,
        name,
        language,
        player_ids,
        question_ids,
        lifelines,
    } = request;

    if name.trim().is_empty() {
        return Err(EngineError::Validation(
            "session name must not be empty".into(),
        ));
    }

    if player_ids.is_empty() {
        return Err(EngineError::Validation(
            "a session requires at least one player".into(),
        ));
    }

    let mut seen_players = HashSet::new();
    for id in &player_ids {
        if !seen_players.insert(id.as_str()) {
            return Err(EngineError::Validation(format!(
                "duplicate player `{id}` in turn order"
            )));
        }
    }

    let mut seen_questions = HashSet::new();
    for id in &question_ids {
        if !seen_questions.insert(*id) {
            return Err(EngineError::Validation(format!(
                "duplicate question `{id}` selected"
            )));
        }
    }

    if question_ids.is_empty() || question_ids.len() % player_ids.len() != 0 {
        return Err(EngineError::Validation(format!(
            "number of questions ({}) must be a positive multiple of the number of players ({})",
            question_ids.len(),
            player_ids.len()
        )));
    }

    let questions = state
        .question_bank()
        .get_by_ids(question_ids.clone())
        .await?;
    if questions.len() != question_ids.len() {
        let found: HashSet<Uuid> = questions.iter().map(|question| question.id).collect();
        let missing = question_ids
            .iter()
            .find(|id| !found.contains(id))
            .copied()
            .unwrap_or_default();
        return Err(EngineError::Validation(format!(
            "unknown question `{missing}`"
        )));
    }

    if let Some(mismatch) = questions
        .iter()
        .find(|question| question.language != language)
    {
        return Err(EngineError::Validation(format!(
            "question `{}` is not in the session language",
            mismatch.id
        )));
    }

    let allotment = lifelines
        .map(Into::into)
        .unwrap_or_else(|| state.config().default_lifelines());

    let directory = state.player_directory();
    let mut players = Vec::with_capacity(player_ids.len());
    for id in &player_ids {
        let Some(player) = directory.get(id.clone()).await? else {
            return Err(EngineError::Validation(format!("unknown player `{id}`")));
        };
        players.push(SessionPlayer::snapshot_of(&player, allotment));
    }

    let session = GameSession::new(name, language, created_by, players, questions);

    let store = state.require_session_store().await?;
    let version = store.create(session.clone()).await?;

    info!(
        session = %session.id,
        players = session.players.len(),
        questions = session.questions.len(),
        "created session"
    );

    Ok(SessionSummary::from(VersionedSession { session, version }))
}

/// Read one session as a versioned snapshot.
pub async fn get_session(state: &SharedState, id: Uuid) -> Result<SessionSummary, EngineError> {
    let versioned = load(state, id).await?;
    Ok(versioned.into())
}

/// Pick the question for the current turn (Selecting → Answering).
///
/// The first successful selection of a Waiting session is its explicit
/// start and moves it to InProgress.
pub async fn select_question(
    state: &SharedState,
    id: Uuid,
    request: SelectQuestionRequest,
) -> Result<SessionSummary, EngineError> {
    let VersionedSession {
        mut session,
        version,
    } = load(state, id).await?;

    ensure_open(&session)?;
    ensure_turn(state, &request.player_id, &session).await?;

    if let Some(selected) = session.current_selected_question_id {
        return Err(EngineError::InvalidSelection(format!(
            "question `{selected}` is already selected; answer it or spend a switch"
        )));
    }

    if session.question(request.question_id).is_none() {
        return Err(EngineError::InvalidSelection(format!(
            "question `{}` is not part of this session",
            request.question_id
        )));
    }

    if session.is_answered(request.question_id) {
        return Err(EngineError::InvalidSelection(format!(
            "question `{}` was already answered",
            request.question_id
        )));
    }

    session.current_selected_question_id = Some(request.question_id);
    if session.status == SessionStatus::Waiting {
        session.status = SessionStatus::InProgress;
    }

    let store = state.require_session_store().await?;
    let version = store.update(id, version, session.clone()).await?;

    Ok(SessionSummary::from(VersionedSession { session, version }))
}

/// Grade the pending question and advance the turn, completing the session
/// when the log covers every question.
pub async fn submit_answer(
    state: &SharedState,
    id: Uuid,
    request: SubmitAnswerRequest,
) -> Result<AnswerOutcome, EngineError> {
    let VersionedSession {
        mut session,
        version,
    } = load(state, id).await?;

    ensure_open(&session)?;
    ensure_turn(state, &request.player_id, &session).await?;

    if session.current_selected_question_id != Some(request.question_id) {
        return Err(EngineError::InvalidSelection(format!(
            "question `{}` is not the current selection",
            request.question_id
        )));
    }

    let question = session
        .question(request.question_id)
        .ok_or_else(|| {
            EngineError::InvalidSelection(format!(
                "question `{}` is not part of this session",
                request.question_id
            ))
        })?
        .clone();

    let Some(answer) = question.answers.get(request.answer_index) else {
        return Err(EngineError::InvalidSelection(format!(
            "answer index {} is out of range for question `{}`",
            request.answer_index, request.question_id
        )));
    };

    let is_correct = answer.correct;
    let points_delta = state
        .config()
        .score_table()
        .points_delta(question.difficulty, is_correct);

    // The answer is attributed to the turn holder even when an admin
    // override submitted it.
    let acting_player_id = session.current_turn_player_id.clone();
    let now = SystemTime::now();

    session.player_answers.push(PlayerAnswer {
        player_id: acting_player_id.clone(),
        question_id: request.question_id,
        answer_index: request.answer_index,
        is_correct,
        points_delta,
        timestamp: now,
    });

    session
        .player_mut(&acting_player_id)
        .ok_or_else(|| {
            EngineError::NotFound(format!("player `{acting_player_id}` is not in the session"))
        })?
        .score += points_delta;

    session.current_selected_question_id = None;

    let completed = session.all_answered();
    if completed {
        session.status = SessionStatus::Completed;
        session.completed_at = Some(now);
    } else {
        session.status = SessionStatus::InProgress;
        session.current_turn_player_id = session.next_turn_player_id();
    }

    let store = state.require_session_store().await?;
    let version = store.update(id, version, session.clone()).await?;

    info!(
        session = %id,
        player = %acting_player_id,
        question = %request.question_id,
        is_correct,
        points_delta,
        completed,
        "graded answer"
    );

    if completed {
        // The session commit stands regardless of how the rollup fares; a
        // failed rollup is re-runnable through its own operation.
        if let Err(err) = rollup_service::apply_rollup(state, id).await {
            warn!(session = %id, error = %err, "completion rollup failed; re-run it manually");
        }
    }

    Ok(AnswerOutcome {
        is_correct,
        points_delta,
        next_turn_player_id: session.current_turn_player_id,
        completed,
        version,
    })
}

/// Spend one lifeline during the caller's turn.
///
/// All three lifelines are scoped to the answering sub-state: a question
/// must be selected. The counter decrement is part of the same conditional
/// write as the lifeline's effect, so a double invocation can only consume
/// one unit.
pub async fn use_lifeline(
    state: &SharedState,
    id: Uuid,
    kind: LifelineKind,
    player_id: String,
) -> Result<LifelineOutcome, EngineError> {
    let VersionedSession {
        mut session,
        version,
    } = load(state, id).await?;

    ensure_open(&session)?;
    ensure_turn(state, &player_id, &session).await?;

    let Some(selected) = session.current_selected_question_id else {
        return Err(EngineError::InvalidSelection(
            "lifelines apply to the selected question; select one first".into(),
        ));
    };

    let acting_player_id = session.current_turn_player_id.clone();
    let player = session.player_mut(&acting_player_id).ok_or_else(|| {
        EngineError::NotFound(format!("player `{acting_player_id}` is not in the session"))
    })?;

    let uses = player.lifeline_uses_mut(kind);
    if *uses == 0 {
        return Err(EngineError::LifelineExhausted(kind));
    }
    *uses -= 1;
    let remaining_uses = *uses;

    let mut selection_cleared = false;
    let mut kept_answer_indexes = None;

    match kind {
        LifelineKind::ExternalHelp => {}
        LifelineKind::FiftyFifty => {
            let question = session.question(selected).ok_or_else(|| {
                EngineError::InvalidSelection(format!(
                    "question `{selected}` is not part of this session"
                ))
            })?;
            kept_answer_indexes = Some(fifty_fifty_indexes(question)?);
        }
        LifelineKind::Switch => {
            session.current_selected_question_id = None;
            selection_cleared = true;
        }
    }

    let store = state.require_session_store().await?;
    let version = store.update(id, version, session.clone()).await?;

    info!(
        session = %id,
        player = %acting_player_id,
        ?kind,
        remaining_uses,
        "lifeline spent"
    );

    Ok(LifelineOutcome {
        kind,
        remaining_uses,
        kept_answer_indexes,
        selection_cleared,
        version,
    })
}

/// Answer indexes that stay visible after a fifty-fifty: the correct option
/// plus one randomly retained decoy. The persisted question is untouched.
fn fifty_fifty_indexes(question: &Question) -> Result<Vec<usize>, EngineError> {
    let correct = question.correct_index().ok_or_else(|| {
        EngineError::InvalidSelection(format!("question `{}` has no correct answer", question.id))
    })?;

    let decoys: Vec<usize> = (0..question.answers.len())
        .filter(|index| *index != correct)
        .collect();

    let mut kept = vec![correct];
    if let Some(decoy) = decoys.choose(&mut rand::rng()) {
        kept.push(*decoy);
    }
    kept.sort_unstable();
    Ok(kept)
}

async fn load(state: &SharedState, id: Uuid) -> Result<VersionedSession, EngineError> {
    let store = state.require_session_store().await?;
    store
        .get(id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("session `{id}`")))
}

fn ensure_open(session: &GameSession) -> Result<(), EngineError> {
    if session.status == SessionStatus::Completed {
        return Err(EngineError::InvalidSelection(
            "session is already completed".into(),
        ));
    }
    Ok(())
}

/// Turn check: resolve the caller's role only when the admin override could
/// change the outcome, then run the pure capability check.
async fn ensure_turn(
    state: &SharedState,
    player_id: &str,
    session: &GameSession,
) -> Result<(), EngineError> {
    let policy = state.config().turn_policy();

    let actor = if player_id == session.current_turn_player_id || !policy.admin_override {
        Actor::player(player_id)
    } else {
        let role = state
            .player_directory()
            .get(player_id.to_owned())
            .await?
            .map(|player| player.role);
        Actor {
            player_id: player_id.to_owned(),
            role,
        }
    };

    if access::may_act(policy, &actor, session) {
        Ok(())
    } else {
        Err(EngineError::NotYourTurn(format!(
            "player `{}` does not hold the turn",
            actor.player_id
        )))
    }
}
