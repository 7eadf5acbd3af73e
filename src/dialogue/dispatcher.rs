//! Routing from an inbound event to the next scripted reply.
//!
//! The exact-label table is data, not control flow: an ordered slice of
//! rules evaluated first-match-wins, with the trait/entity rules after
//! it and the fallback last. The evaluation order is itself an
//! invariant — several rules can match the same input.

use tracing::{debug, warn};

use crate::dialogue::script;
use crate::error::DeliveryError;
use crate::messenger::{OutboundAction, OutboundMessage, ProfileLookup};
use crate::nlu::{
    Classifier, ClassifierResult, ENTITY_DATETIME, ENTITY_STORY, TRAIT_BYE, TRAIT_GET_STARTED,
    TRAIT_GREETINGS, TRAIT_THANKS,
};
use crate::session::DialogueState as S;
use crate::session::{DialogueState, Session};
use crate::webhook::event::InboundEvent;

/// Postback payload of the persistent "get started" button.
pub const GREETING_PAYLOAD: &str = "Greeting";

/// How exact-label rules are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutingMode {
    /// Labels route on their verbatim title text alone; state advances
    /// are recorded but never gate.
    Compat,
    /// A label rule fires only when the session state is one the rule
    /// expects; otherwise the input falls through to the trait rules
    /// and the fallback, state unchanged.
    StateGated,
}

/// What a routed input resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAction {
    Greeting,
    Encouragement,
    Pause,
    StepOne,
    StepTwo,
    StepThree,
    StepFour,
    FinalStep,
    ReportingFollowUp,
    Decline,
    Timing,
    Advice,
    Feelings,
    Thanks,
    Bye,
    Fallback,
}

/// One row of the exact-label routing table.
struct LabelRule {
    labels: &'static [&'static str],
    action: RouteAction,
    /// States in which the rule is live under state-gated routing;
    /// `None` means any state.
    expected: Option<&'static [DialogueState]>,
}

const LABEL_RULES: &[LabelRule] = &[
    LabelRule {
        labels: &["Yeah"],
        action: RouteAction::Encouragement,
        expected: Some(&[S::AwaitingAdviceResponse]),
    },
    LabelRule {
        labels: &["Not now", "Maybe Later", "Lets take a break"],
        action: RouteAction::Pause,
        expected: None,
    },
    LabelRule {
        labels: &["Yeah, Sure", "Yeah Sure", "step", "ok", "sure", "Nah"],
        action: RouteAction::StepOne,
        expected: Some(&[S::Idle, S::AwaitingConsent, S::AwaitingAdviceResponse]),
    },
    LabelRule {
        labels: &["Go on"],
        action: RouteAction::StepTwo,
        expected: Some(&[S::StepOne]),
    },
    LabelRule {
        labels: &["Keep Going"],
        action: RouteAction::StepThree,
        expected: Some(&[S::StepTwo]),
    },
    LabelRule {
        labels: &["Next Step"],
        action: RouteAction::StepFour,
        expected: Some(&[S::StepThree, S::StepFour]),
    },
    LabelRule {
        labels: &["Definitely"],
        action: RouteAction::FinalStep,
        expected: Some(&[S::StepThree, S::StepFour]),
    },
    // Both case variants of the button title are accepted.
    LabelRule {
        labels: &["I reported", "I did not", "I did Not"],
        action: RouteAction::ReportingFollowUp,
        expected: Some(&[S::AwaitingReportStatus]),
    },
    LabelRule {
        labels: &["No", "no"],
        action: RouteAction::Decline,
        expected: Some(&[S::AwaitingConsent]),
    },
    LabelRule {
        labels: &["Yes, long ago", "Yes, recently"],
        action: RouteAction::Timing,
        expected: Some(&[S::AwaitingConsent]),
    },
    LabelRule {
        labels: &["More than 6 months"],
        action: RouteAction::Advice,
        expected: Some(&[S::AwaitingTiming]),
    },
];

/// Route one piece of text. Pure: no I/O, no session mutation.
pub fn route(
    text: &str,
    nlu: &ClassifierResult,
    state: DialogueState,
    mode: RoutingMode,
) -> RouteAction {
    if nlu.first_trait(TRAIT_GREETINGS).is_some() {
        return RouteAction::Greeting;
    }
    for rule in LABEL_RULES {
        if !rule.labels.contains(&text) {
            continue;
        }
        if mode == RoutingMode::StateGated {
            if let Some(expected) = rule.expected {
                if !expected.contains(&state) {
                    continue;
                }
            }
        }
        return rule.action;
    }
    if nlu.first_trait(TRAIT_GET_STARTED).is_some() {
        return RouteAction::Timing;
    }
    if nlu.first_entity(ENTITY_DATETIME).is_some() {
        return RouteAction::Advice;
    }
    if nlu.first_entity(ENTITY_STORY).is_some() {
        return RouteAction::Feelings;
    }
    if nlu.first_trait(TRAIT_THANKS).is_some() {
        return RouteAction::Thanks;
    }
    if nlu.first_trait(TRAIT_BYE).is_some() {
        return RouteAction::Bye;
    }
    RouteAction::Fallback
}

/// State after `action` fires. Unmatched inputs leave state untouched.
pub fn advance(action: RouteAction, current: DialogueState) -> DialogueState {
    match action {
        RouteAction::StepOne => S::StepOne,
        RouteAction::StepTwo => S::StepTwo,
        RouteAction::StepThree => S::StepThree,
        RouteAction::StepFour => S::StepFour,
        RouteAction::FinalStep => S::AwaitingReportStatus,
        RouteAction::Timing => S::AwaitingTiming,
        RouteAction::Advice => S::AwaitingAdviceResponse,
        RouteAction::Feelings => S::AwaitingConsent,
        RouteAction::Pause | RouteAction::Decline | RouteAction::ReportingFollowUp => S::Idle,
        RouteAction::Greeting
        | RouteAction::Encouragement
        | RouteAction::Thanks
        | RouteAction::Bye
        | RouteAction::Fallback => current,
    }
}

fn render(action: RouteAction, input: &str) -> OutboundMessage {
    match action {
        RouteAction::Encouragement => script::encouragement_reply(),
        RouteAction::Pause => script::pause_reply(),
        RouteAction::StepOne => script::step_one_card(),
        RouteAction::StepTwo => script::step_two_card(),
        RouteAction::StepThree => script::step_three_card(),
        RouteAction::StepFour => script::step_four_card(),
        RouteAction::FinalStep => script::final_step_card(),
        RouteAction::ReportingFollowUp => script::reporting_reply(),
        RouteAction::Decline => script::decline_reply(),
        RouteAction::Timing => script::timing_card(),
        RouteAction::Advice => script::advice_card(),
        RouteAction::Feelings => script::feelings_card(),
        RouteAction::Thanks => script::thanks_reply(),
        RouteAction::Bye => script::bye_reply(),
        // Greeting needs the profile name and is rendered by dispatch.
        RouteAction::Greeting | RouteAction::Fallback => script::fallback_reply(input),
    }
}

/// Maps one inbound event plus the user's session to the next outbound
/// action(s).
pub struct Dispatcher {
    mode: RoutingMode,
}

impl Dispatcher {
    pub fn new(mode: RoutingMode) -> Self {
        Self { mode }
    }

    /// Evaluated in strict priority order: attachments first, then the
    /// greeting postback (neither consults the classifier), then text
    /// routing. A classifier failure downgrades to exact-text rules.
    pub async fn dispatch(
        &self,
        event: &InboundEvent,
        session: &mut Session,
        classifier: &dyn Classifier,
        profiles: &dyn ProfileLookup,
    ) -> Result<Vec<OutboundAction>, DeliveryError> {
        match event {
            InboundEvent::Attachment { sender_id } => {
                Ok(vec![action(sender_id, script::attachment_reply())])
            }
            InboundEvent::Postback { sender_id, payload } => {
                if payload == GREETING_PAYLOAD {
                    let profile = profiles.profile(sender_id).await?;
                    session.state = DialogueState::AwaitingConsent;
                    Ok(vec![action(sender_id, script::welcome_card(&profile.first_name))])
                } else {
                    debug!(payload = %payload, "ignoring unrecognized postback");
                    Ok(Vec::new())
                }
            }
            InboundEvent::Text { sender_id, text } => {
                let nlu = match classifier.classify(text).await {
                    Ok(result) => result,
                    Err(err) => {
                        warn!(error = %err, "classification failed, routing on exact text only");
                        ClassifierResult::default()
                    }
                };
                let routed = route(text, &nlu, session.state, self.mode);
                debug!(action = ?routed, state = %session.state, "routed text event");
                let message = match routed {
                    RouteAction::Greeting => {
                        let profile = profiles.profile(sender_id).await?;
                        script::greeting_reply(&profile.first_name)
                    }
                    other => render(other, text),
                };
                session.state = advance(routed, session.state);
                Ok(vec![OutboundAction {
                    recipient_id: sender_id.clone(),
                    message,
                }])
            }
        }
    }
}

fn action(recipient_id: &str, message: OutboundMessage) -> OutboundAction {
    OutboundAction {
        recipient_id: recipient_id.to_string(),
        message,
    }
}
