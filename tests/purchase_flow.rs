//! Purchase flow tests through the event router.

use std::sync::Arc;

use matebot::gateway::types::{AccountId, DrinkId, Money};
use matebot::router::events::{ChatRef, Identity, InboundEvent, MessageRef};
use matebot::router::render::Render;
use matebot::store::{LinkStore, PlatformId};
use matebot::Bot;

mod common;
use common::MockLedger;

fn command(name: &str, sender: Identity) -> InboundEvent {
    InboundEvent::Command {
        name: name.to_string(),
        sender,
        chat: ChatRef(1),
    }
}

fn free_text(text: &str, sender: Identity) -> InboundEvent {
    InboundEvent::FreeText {
        text: text.to_string(),
        sender,
        chat: ChatRef(1),
    }
}

fn press(token: &str, presser: Identity) -> InboundEvent {
    InboundEvent::ButtonPress {
        query_id: "cb1".to_string(),
        token: token.to_string(),
        presser,
        message: MessageRef {
            chat: ChatRef(1),
            message_id: 10,
        },
    }
}

/// Store with identity 100 linked to account 1.
fn linked_bot(ledger: MockLedger) -> Bot<MockLedger> {
    let store = Arc::new(LinkStore::in_memory());
    store
        .create_link(PlatformId(100), AccountId(1), None)
        .unwrap();
    Bot::new(store, ledger)
}

fn sent_text(renders: &[Render]) -> &str {
    match &renders[0] {
        Render::SendMessage { text, .. } => text,
        other => panic!("expected message, got {:?}", other),
    }
}

#[tokio::test]
async fn button_purchase_charges_once_and_redraws_keyboard() {
    let ledger = MockLedger::new()
        .with_account(1, "buyer", 500)
        .with_drink(7, "Cola", 100, true);
    let bot = linked_bot(ledger.clone());

    // /buy renders one button per active drink.
    let renders = bot.handle(command("buy", Identity::new(100))).await;
    match &renders[0] {
        Render::SendMessage { keyboard, .. } => {
            assert_eq!(keyboard.as_ref().unwrap().tokens(), vec!["v1:buy:7"]);
        }
        other => panic!("expected message, got {:?}", other),
    }

    // Pressing the button issues exactly one charge for drink 7 and the
    // rendered balance is the post-charge value from a fresh fetch.
    let renders = bot.handle(press("v1:buy:7", Identity::new(100))).await;
    assert_eq!(ledger.charges(), vec![(AccountId(1), DrinkId(7))]);
    match &renders[0] {
        Render::AnswerButtonPress { text, .. } => assert!(text.contains("Cola")),
        other => panic!("expected ack, got {:?}", other),
    }
    match &renders[1] {
        Render::EditMessage { text, keyboard, .. } => {
            assert!(text.contains("4.00€"));
            // The keyboard is redrawn in place, reusable for a repeat buy.
            assert_eq!(keyboard.as_ref().unwrap().tokens(), vec!["v1:buy:7"]);
        }
        other => panic!("expected edit, got {:?}", other),
    }

    // Repeat purchase through the redrawn keyboard charges again.
    bot.handle(press("v1:buy:7", Identity::new(100))).await;
    assert_eq!(ledger.charges().len(), 2);
    assert_eq!(ledger.balance_of(1), Some(Money(300)));
}

#[tokio::test]
async fn free_text_purchase_requires_exact_line() {
    let ledger = MockLedger::new()
        .with_account(1, "buyer", 500)
        .with_drink(7, "Cola", 150, true);
    let bot = linked_bot(ledger.clone());

    // The displayed price is 1.50; the echoed line with 1.00 must not match.
    let renders = bot
        .handle(free_text("Cola: 1.00€", Identity::new(100)))
        .await;
    assert!(sent_text(&renders).contains("did not understand"));
    assert!(ledger.charges().is_empty());

    // The exact catalog line goes through.
    let renders = bot
        .handle(free_text("Cola: 1.50€", Identity::new(100)))
        .await;
    assert_eq!(ledger.charges(), vec![(AccountId(1), DrinkId(7))]);
    assert!(sent_text(&renders).contains("3.50€"));
}

#[tokio::test]
async fn inactive_drinks_cannot_be_bought() {
    let ledger = MockLedger::new()
        .with_account(1, "buyer", 500)
        .with_drink(7, "Retired", 100, false);
    let bot = linked_bot(ledger.clone());

    let renders = bot.handle(press("v1:buy:7", Identity::new(100))).await;
    assert!(ledger.charges().is_empty());
    // Message and keyboard are left alone; only the press is answered.
    assert_eq!(renders.len(), 1);
    assert!(matches!(&renders[0], Render::AnswerButtonPress { .. }));

    let renders = bot
        .handle(free_text("Retired: 1.00€", Identity::new(100)))
        .await;
    assert!(sent_text(&renders).contains("did not understand"));
    assert!(ledger.charges().is_empty());
}

#[tokio::test]
async fn unlinked_buyers_are_refused_without_a_charge() {
    let ledger = MockLedger::new()
        .with_account(1, "buyer", 500)
        .with_drink(7, "Cola", 100, true);
    let store = Arc::new(LinkStore::in_memory());
    store
        .create_link(PlatformId(50), AccountId(2), None)
        .unwrap();
    store.promote(PlatformId(50), Some("@treasurer")).unwrap();
    let bot = Bot::new(store, ledger.clone());

    let renders = bot
        .handle(free_text("Cola: 1.00€", Identity::new(999)))
        .await;
    let text = sent_text(&renders);
    assert!(text.contains("not linked"));
    // The refusal points at an admin who can run the link handshake.
    assert!(text.contains("@treasurer"));
    assert!(ledger.charges().is_empty());
}

#[tokio::test]
async fn negative_balance_renders_warning() {
    let ledger = MockLedger::new()
        .with_account(1, "buyer", 50)
        .with_drink(7, "Cola", 100, true);
    let bot = linked_bot(ledger.clone());

    let renders = bot.handle(press("v1:buy:7", Identity::new(100))).await;
    match &renders[1] {
        Render::EditMessage { text, .. } => {
            assert!(text.contains("-0.50€"));
            assert!(text.contains("negative"));
        }
        other => panic!("expected edit, got {:?}", other),
    }
}

#[tokio::test]
async fn gateway_outage_surfaces_without_a_charge() {
    let ledger = MockLedger::new()
        .with_account(1, "buyer", 500)
        .with_drink(7, "Cola", 100, true);
    let bot = linked_bot(ledger.clone());
    ledger.set_unreachable(true);

    let renders = bot
        .handle(free_text("Cola: 1.00€", Identity::new(100)))
        .await;
    assert!(sent_text(&renders).contains("unreachable"));
    assert!(ledger.charges().is_empty());

    let renders = bot.handle(command("list", Identity::new(100))).await;
    assert!(sent_text(&renders).contains("unreachable"));
}

#[tokio::test]
async fn list_and_balance_commands_render_fresh_state() {
    let ledger = MockLedger::new()
        .with_account(1, "buyer", -420)
        .with_drink(7, "Cola", 100, true)
        .with_drink(8, "Mate", 150, true)
        .with_drink(9, "Retired", 99, false);
    let bot = linked_bot(ledger);

    let renders = bot.handle(command("list", Identity::new(100))).await;
    assert_eq!(sent_text(&renders), "Cola: 1.00€\nMate: 1.50€");

    let renders = bot.handle(command("balance", Identity::new(100))).await;
    let text = sent_text(&renders);
    assert!(text.contains("-4.20€"));
    assert!(text.contains("negative"));

    let renders = bot.handle(command("start", Identity::new(100))).await;
    assert!(sent_text(&renders).contains("/balance"));

    let renders = bot.handle(command("dance", Identity::new(100))).await;
    assert!(sent_text(&renders).contains("did not understand"));
}
