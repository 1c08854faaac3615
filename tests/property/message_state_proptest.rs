//! Property-based tests for message delivery state
//!
//! Whatever order updates arrive in, a message only ever moves forward
//! through sent, delivered and seen.

use ecofinds::shared::marketplace::{ChatMessage, Conversation, MessageState};
use proptest::prelude::*;
use uuid::Uuid;

fn state() -> impl Strategy<Value = MessageState> {
    prop_oneof![
        Just(MessageState::Sent),
        Just(MessageState::Delivered),
        Just(MessageState::Seen),
    ]
}

proptest! {
    #[test]
    fn test_state_never_moves_backwards(updates in prop::collection::vec(state(), 0..20)) {
        let mut current = MessageState::Sent;
        for target in updates {
            let before = current;
            let changed = current.advance_to(target);
            prop_assert!(current >= before);
            prop_assert_eq!(changed, target > before);
            prop_assert_eq!(current, before.max(target));
        }
    }

    #[test]
    fn test_state_wire_name_roundtrip(s in state()) {
        prop_assert_eq!(s.as_str().parse::<MessageState>().ok(), Some(s));
    }

    #[test]
    fn test_advance_inbound_skips_own_messages(
        senders in prop::collection::vec(any::<bool>(), 1..12),
        target in state(),
    ) {
        let buyer = Uuid::new_v4();
        let owner = Uuid::new_v4();
        let mut conversation = Conversation::new(Uuid::new_v4(), buyer, owner);
        for &from_buyer in &senders {
            let sender = if from_buyer { buyer } else { owner };
            conversation.push(ChatMessage::new(sender, "hi".to_string()));
        }

        let changed = conversation.advance_inbound(owner, target);

        let inbound = senders.iter().filter(|&&b| b).count();
        let expected = if target > MessageState::Sent { inbound } else { 0 };
        prop_assert_eq!(changed.len(), expected);
        for message in &conversation.messages {
            if message.sender_id == owner {
                prop_assert_eq!(message.status, MessageState::Sent);
            }
        }

        // A second pass with the same target is a no-op
        prop_assert!(conversation.advance_inbound(owner, target).is_empty());
    }
}
