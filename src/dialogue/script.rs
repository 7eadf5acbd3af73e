//! Scripted conversation content.
//!
//! Everything the bot can say: the recovery-step paragraphs, the prompts
//! around them, their quick-reply sets, and the small pools of phrasings
//! picked at random for conversational niceties. The conversation is a
//! directed graph of these fixed cards keyed by quick-reply labels.

use rand::seq::SliceRandom;

use crate::messenger::{OutboundMessage, QuickReply};

// ── Phrase pools ────────────────────────────────────────

pub const GREETING_PHRASES: &[&str] = &["Hey ", "Hello ", "Hi "];
pub const THANKS_PHRASES: &[&str] = &["You are welcome", "Welcome", "Glad I could help"];
pub const BYE_PHRASES: &[&str] = &["Bye bye", "Goodbye", "Bye"];
pub const FEELINGS_PHRASES: &[&str] = &[
    "I can't say I understand all you're going through but I am here to help. \n\nWould you like me to recommend steps to help you recover from such trauma",
    "I know it must be really difficult right now but all hope is not lost. \n\nI can help you with steps to get better, Would you want that?",
    "This must be very difficult but believe me when I say all hope is not lost. \n\nAllow me to recommend steps to help you with this experience.",
];

/// Uniform random pick from a phrase pool.
pub fn pick(pool: &'static [&'static str]) -> &'static str {
    pool.choose(&mut rand::thread_rng()).copied().unwrap_or("")
}

// ── Canned paragraphs ───────────────────────────────────

pub const ATTACHMENT_REPLY: &str =
    "Thank you for always keeping in touch but I do not understand.";
pub const ENCOURAGEMENT_REPLY: &str = "Please go on. I'm here for you";
pub const PAUSE_REPLY: &str = "Alright, just type 'step' when you are ready";
pub const REPORTING_REPLY: &str = "It may too much to ask but reporting a rape case to appropriate authorities is your civic responsibility and you may be saving another victim and at the same time making sure the guilty does not go free which will also deter future offenders.";
pub const DECLINE_REPLY: &str = "Rape is a very serious act which is a danger to human existence. Perhaps I can help you recommend ways to help someone who has experienced such an act.";
pub const TIMING_PROMPT: &str = "When did this occur:";

pub const WELCOME_TEXT: &str = "\n\nWelcome to Stigmatized. \n\nI am Chloe, here to offer any help I can, to you or any other person who has been involved in any form of sexual assault, and hey!, it's just between you and I. \n\nHave you ever experienced any form of sexual assault before? ";

pub const STEP_ONE_TEXT: &str = "*Open up about what happened to you\n\nIt can be extraordinarily difficult to admit that you were raped or sexually assaulted. There’s a stigma attached. It can make you feel dirty and weak. You may also be afraid of how others will react. Will they judge you? Look at you differently? It seems easier to downplay what happened or keep it a secret. But when you stay silent, you deny yourself help and reinforce your victimhood. \n\nReach out to someone you trust. It’s common to think that if you don’t talk about your rape, it didn’t really happen. But you can’t heal when you’re avoiding the truth. And hiding only adds to feelings of shame. As scary as it is to open up, it will set you free. However, it’s important to be selective about who you tell, especially at first. Your best bet is someone who will be supportive, empathetic, and calm. If you don’t have someone you trust, talk to a therapist or call a rape crisis hotline. \n\nChallenge your sense of helplessness and isolation. Trauma leaves you feeling powerless and vulnerable. It’s important to remind yourself that you have strengths and coping skills that can get you through tough times. One of the best ways to reclaim your sense of power is by helping others: volunteer your time, give blood, reach out to a friend in need, or donate to your favorite charity. \n\nConsider joining a support group for other rape or sexual abuse survivors. Support groups can help you feel less isolated and alone. They also provide invaluable information on how to cope with symptoms and work towards recovery. If you can’t find a support group in your area, look for an online group. \n\n Would you want me to continue";

pub const STEP_TWO_TEXT: &str = "*Cope with feelings of guilt and shame \n\nEven if you intellectually understand that you’re not to blame for the rape or sexual attack, you may still struggle with a sense of guilt or shame. These feelings can surface immediately following the assault or arise years after the attack. But as you acknowledge the truth of what happened, it will be easier to fully accept that you are not responsible. You did not bring the assault on yourself and you have nothing to be ashamed about. \n\nFeelings of guilt and shame often stem from misconceptions such as:\n\nYou didn’t stop the assault from happening. After the fact, it’s easy to second guess what you did or didn’t do. But when you’re in the midst of an assault, your brain and body are in shock. You can’t think clearly. Many people say they feel “frozen.” Don’t judge yourself for this natural reaction to trauma. You did the best you could under extreme circumstances. If you could have stopped the assault, you would have.\n\nYou trusted someone you “shouldn’t” have. One of the most difficult things to deal with following an assault by someone you know is the violation of trust. It’s natural to start questioning yourself and wondering if you missed warning signs. Just remember that your attacker is the only one to blame. Don’t beat yourself up for assuming that your attacker was a decent human being. Your attacker is the one who should feel guilty and ashamed, not you.\n\nYou were drunk or not cautious enough. Regardless of the circumstances, the only one who is responsible for the assault is the perpetrator. You did not ask for it or deserve what happened to you. Assign responsibility where it belongs: on the rapist. \n\nI'm sure this is large. I can continue if you want that";

pub const STEP_THREE_TEXT: &str = "*Prepare for flashbacks and upsetting memories\n\nWhen you go through something stressful, your body temporarily goes into “fight-or-flight” mode. You’re hyper sensitive to the smallest of stimuli. This is the case for many rape survivors. Flashbacks, nightmares, and intrusive memories are extremely common, especially in the first few months following the assault. If your nervous system remains “stuck” in the long-term and you develop post-traumatic stress disorder (PTSD), they can last much longer.\n\nTo reduce the stress of flashbacks and upsetting memories:\n\nTry to anticipate and prepare for triggers. Common triggers include anniversary dates; people or places associated with the rape; and certain sights, sounds, or smells. \n\nPay attention to your body’s danger signals. Your body and emotions give you clues when you’re starting to feel stressed and unsafe. \n\nTake immediate steps to self-soothe. When you notice any of the above symptoms, it’s important to quickly act to calm yourself down before they spiral out of control. One of the quickest and most effective ways to calm anxiety and panic is to slow down your breathing.\n\nTips for dealing with flashbacks\n\nIt’s not always possible to prevent flashbacks. But if you find yourself losing touch with the present and feeling like the sexual assault is happening all over again, there are actions you can take.\n\nAccept and reassure yourself that this is a flashback, not reality. The traumatic event is over and you survived. Here’s a simple script that can help: “I am feeling [panicked, frightened, overwhelmed, etc.] because I am remembering the rape/sexual assault, but as I look around I can see that the assault isn’t happening right now and I’m not actually in danger.”\n\nCan we go to the next one?";

pub const STEP_FOUR_TEXT: &str = "*Reconnect to your body and feelings\n\nSince your nervous system is in a hypersensitive state following a rape or assault, you may start trying to numb yourself or avoid any associations with the trauma. But you can’t selectively numb your feelings. When you shut down the unpleasant sensations, you also shut down your self-awareness and capacity for joy. You end up disconnected both emotionally and physically—existing, but not fully living.\n\nSigns that you’re avoiding and numbing in unhelpful ways:\n\nFeeling physically shut down. You don’t feel bodily sensations like you used to (you might even have trouble differentiating between pleasure and pain).\n\nFeeling separate from your body or surroundings (you may feel like you’re watching yourself or the situation you’re in, rather than participating in it).\n\nHaving trouble concentrating and remembering things.\n\nUsing stimulants, risky activities, or physical pain to feel alive and counteract the empty feeling inside of you.\n\nCompulsively using drugs or alcohol.\n\nEscaping through fantasies, daydreams, or excessive TV, video games, etc.\n\nFeeling detached from the world, the people in your life, and the activities you used to enjoy.\n\nTo recover after rape, you need to reconnect to your body and feelings.\n\nIt’s frightening to get back in touch with your body and feelings following a sexual trauma. In many ways, rape makes your body the enemy, something that’s been violated and contaminated—something you may hate or want to ignore. It’s also scary to face the intense feelings associated with the assault. But while the process of reconnecting may feel threatening, it’s not actually dangerous. Feelings, while powerful, are not reality. They won’t hurt you or drive you insane. The true danger to your physical and mental health comes from avoiding them.\n\nOnce you’re back in touch with your body and feelings, you will feel more safe, confident, and powerful.\n\nThis is the last step, I bet you want to hear it all";

pub const FINAL_STEP_TEXT: &str = "*Stay connected\n\nIt’s common to feel isolated and disconnected from others following a sexual assault. You may feel tempted to withdraw from social activities and your loved ones. But it’s important to stay connected to life and the people who care about you. Support from other people is vital to your recovery. But remember that support doesn’t mean that you always have to talk about or dwell on what happened. Having fun and laughing with people who care about you can be equally healing.\n\nParticipate in social activities, even if you don’t feel like it. \n\nMake new friends. If you live alone or far from family and friends, try to reach out and make new friends. \n\n\n\nNurture yourself\n\nHealing from sexual trauma is a gradual, ongoing process. It doesn’t happen overnight, nor do the memories of the trauma ever disappear completely. This can make life seem difficult at times. But there are many steps you can take to cope with the residual symptoms and reduce your anxiety and fear.\n\nTake time to rest and restore your body’s balance. That means taking a break when you’re tired and avoiding the temptation to lose yourself by throwing yourself into activities. Avoid doing anything compulsively, including working. \n\nBe smart about media consumption. Avoid watching any program that could trigger bad memories or flashbacks. This includes obvious things such as news reports about sexual violence and sexually explicit TV shows and movies.\n\nAvoid alcohol and drugs. \n\nTake care of yourself physically. It’s always important to eat right, exercise regularly, and get plenty of sleep. Exercise in particular can soothe your traumatized nervous system, relieve stress, and help you feel more powerful and in control of your body.\n\nDid you report this to the police";

pub const ADVICE_TEXT: &str = "I want to make it clear to you that it is not your fault that this happened. Therefore you don't have any reason to blame yourself. \n1. They choose to rapists, you are the victim not the guilty. \n2. There are no surefire way to identify a rapist. Sometimes they are completely normal, nice, charming and non-threatening. \n3. Rape is a crime of opportunity. Studies show that rapists choose victims based on their vulnerability, not on how sexy they appear or how flirtatious they are.\n4. Date rapists often defend themselves by claiming the assault was a drunken mistake or miscommunication. But research shows that the vast majority of date rapists are repeat offenders. These men target vulnerable people and often ply them with alcohol in order to rape them. \n5. Just because you’ve previously consented to sex with someone doesn’t give them perpetual rights to your body. If your spouse, boyfriend, or lover forces sex against your will, it’s rape. \nOpening up can be a good step towards healing. \n\nCan you tell me how it happened?";

// ── Cards ───────────────────────────────────────────────

fn qr(title: &str, payload: &str) -> QuickReply {
    QuickReply::new(title, payload)
}

/// Onboarding welcome with the consent question.
pub fn welcome_card(first_name: &str) -> OutboundMessage {
    OutboundMessage::with_quick_replies(
        format!("Hi {first_name}!{WELCOME_TEXT}"),
        [
            qr("Yes, recently", "YES"),
            qr("Yes, long ago", "YES"),
            qr("No", "NO"),
        ],
    )
}

/// Short hello addressed by first name.
pub fn greeting_reply(first_name: &str) -> OutboundMessage {
    OutboundMessage::text(format!("{}{}!", pick(GREETING_PHRASES), first_name))
}

pub fn step_one_card() -> OutboundMessage {
    OutboundMessage::with_quick_replies(
        STEP_ONE_TEXT,
        [qr("Go on", "SURE"), qr("Maybe Later", "GOOD")],
    )
}

pub fn step_two_card() -> OutboundMessage {
    OutboundMessage::with_quick_replies(
        STEP_TWO_TEXT,
        [qr("Keep Going", "SURE"), qr("Lets take a break", "GOOD")],
    )
}

pub fn step_three_card() -> OutboundMessage {
    OutboundMessage::with_quick_replies(
        STEP_THREE_TEXT,
        [qr("Definitely", "SURE"), qr("Not now", "GOOD")],
    )
}

pub fn step_four_card() -> OutboundMessage {
    OutboundMessage::with_quick_replies(
        STEP_FOUR_TEXT,
        [qr("Definitely", "SURE"), qr("Not now", "GOOD")],
    )
}

/// Last recovery step; its text asks whether the assault was reported.
pub fn final_step_card() -> OutboundMessage {
    OutboundMessage::with_quick_replies(
        FINAL_STEP_TEXT,
        [qr("I reported", "Yes I did"), qr("I did not", "Not now")],
    )
}

pub fn timing_card() -> OutboundMessage {
    OutboundMessage::with_quick_replies(
        TIMING_PROMPT,
        [
            qr("Today", "payload_1"),
            qr("Yesterday", "payload_2"),
            qr("Last Week", "payload_2"),
            qr("Last Month", "payload_2"),
            qr("More than 3 months", "payload_2"),
            qr("More than 6 months", "payload_2"),
            qr("More than a year", "payload_2"),
        ],
    )
}

pub fn advice_card() -> OutboundMessage {
    OutboundMessage::with_quick_replies(ADVICE_TEXT, [qr("Yeah", "Positive"), qr("Nah", "Negative")])
}

/// Empathy prompt offering the recovery steps, in one of several phrasings.
pub fn feelings_card() -> OutboundMessage {
    OutboundMessage::with_quick_replies(
        pick(FEELINGS_PHRASES),
        [qr("Yeah, Sure", "SURE"), qr("Maybe Later", "Not now")],
    )
}

pub fn attachment_reply() -> OutboundMessage {
    OutboundMessage::text(ATTACHMENT_REPLY)
}

pub fn encouragement_reply() -> OutboundMessage {
    OutboundMessage::text(ENCOURAGEMENT_REPLY)
}

pub fn pause_reply() -> OutboundMessage {
    OutboundMessage::text(PAUSE_REPLY)
}

pub fn reporting_reply() -> OutboundMessage {
    OutboundMessage::text(REPORTING_REPLY)
}

pub fn decline_reply() -> OutboundMessage {
    OutboundMessage::text(DECLINE_REPLY)
}

pub fn thanks_reply() -> OutboundMessage {
    OutboundMessage::text(pick(THANKS_PHRASES))
}

pub fn bye_reply() -> OutboundMessage {
    OutboundMessage::text(pick(BYE_PHRASES))
}

/// Default reply echoing the text nothing matched.
pub fn fallback_reply(text: &str) -> OutboundMessage {
    OutboundMessage::text(format!(
        "This is embarrassing but I cannot understand your text: {text}."
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_stays_within_the_pool() {
        for _ in 0..50 {
            assert!(THANKS_PHRASES.contains(&pick(THANKS_PHRASES)));
            assert!(BYE_PHRASES.contains(&pick(BYE_PHRASES)));
            assert!(FEELINGS_PHRASES.contains(&pick(FEELINGS_PHRASES)));
        }
    }

    #[test]
    fn welcome_card_addresses_the_user_by_name() {
        let card = welcome_card("Ana");
        assert!(card.text.starts_with("Hi Ana!"));
        assert!(card.text.contains("Welcome to Stigmatized."));
        let titles: Vec<&str> = card.quick_replies.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["Yes, recently", "Yes, long ago", "No"]);
    }

    #[test]
    fn greeting_reply_uses_a_pool_phrase_and_the_name() {
        let reply = greeting_reply("Ana");
        assert!(reply.text.ends_with("Ana!"));
        assert!(
            GREETING_PHRASES
                .iter()
                .any(|phrase| reply.text == format!("{phrase}Ana!"))
        );
    }

    #[test]
    fn step_cards_offer_their_continuation_labels() {
        let expectations: [(OutboundMessage, [&str; 2]); 4] = [
            (step_one_card(), ["Go on", "Maybe Later"]),
            (step_two_card(), ["Keep Going", "Lets take a break"]),
            (step_three_card(), ["Definitely", "Not now"]),
            (step_four_card(), ["Definitely", "Not now"]),
        ];
        for (card, titles) in expectations {
            let found: Vec<&str> = card.quick_replies.iter().map(|r| r.title.as_str()).collect();
            assert_eq!(found, titles);
        }
    }

    #[test]
    fn final_step_card_asks_about_reporting() {
        let card = final_step_card();
        assert!(card.text.contains("Did you report this to the police"));
        let titles: Vec<&str> = card.quick_replies.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["I reported", "I did not"]);
    }

    #[test]
    fn timing_card_lists_all_seven_windows() {
        let card = timing_card();
        assert_eq!(card.text, TIMING_PROMPT);
        assert_eq!(card.quick_replies.len(), 7);
        assert_eq!(card.quick_replies[0].title, "Today");
        assert_eq!(card.quick_replies[6].title, "More than a year");
    }

    #[test]
    fn fallback_reply_echoes_the_input_verbatim() {
        let reply = fallback_reply("gibberish input");
        assert_eq!(
            reply.text,
            "This is embarrassing but I cannot understand your text: gibberish input."
        );
    }
}
