// Screen switching, turn gate hand-off and game endings

mod helpers;

use std::cell::RefCell;
use std::rc::Rc;

use helpers::{
    Journal, ProbeScreen, play_session, player_health, press, small_config, world_on, world_with,
};
use pretty_assertions::assert_eq;
use terminal_crawler::dungeon::Level;
use terminal_crawler::ecs::{InventoryHolder, Map, Position};
use terminal_crawler::input::{InputEvent, KeyCode};
use terminal_crawler::items::Item;
use terminal_crawler::renderer::RecordingDisplay;
use terminal_crawler::screens::{GameWorld, MESSAGE_ROWS, ScreenId};
use terminal_crawler::session::Session;

#[test]
fn enter_on_the_start_screen_begins_a_game() {
    let mut session = Session::new(small_config()).unwrap();
    assert_eq!(session.screen_id(), Some(ScreenId::Start));

    let mut display = RecordingDisplay::new(40, 10);
    session.render(&mut display);
    assert_eq!(display.row(2), " Press [Enter] to start!");

    press(&mut session, InputEvent::KeyPress('x'));
    assert_eq!(session.screen_id(), Some(ScreenId::Start));

    press(&mut session, InputEvent::KeyDown(KeyCode::Enter));
    assert_eq!(session.screen_id(), Some(ScreenId::Play));
    assert!(session.context().game.is_some());
    assert!(session.context().gate.is_locked());
}

#[test]
fn exits_run_before_the_next_enter() {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let mut session = Session::new(small_config()).unwrap();

    session.switch_to(ProbeScreen::boxed("play", ScreenId::Play, &journal)).unwrap();
    session
        .context_mut()
        .open_sub_screen(ProbeScreen::boxed("list", ScreenId::ItemList, &journal));
    session.update().unwrap();
    assert!(session.has_sub_screen());

    session.switch_to(ProbeScreen::boxed("lose", ScreenId::Lose, &journal)).unwrap();

    assert_eq!(
        *journal.borrow(),
        vec!["enter play", "enter list", "exit list", "exit play", "enter lose"]
    );
    assert!(!session.has_sub_screen());
    assert!(session.context().gate.is_cancelled());
}

#[test]
fn sub_screen_takes_input_until_closed() {
    let journal: Journal = Rc::new(RefCell::new(Vec::new()));
    let mut session = Session::new(small_config()).unwrap();
    session.switch_to(ProbeScreen::boxed("play", ScreenId::Play, &journal)).unwrap();
    session
        .context_mut()
        .open_sub_screen(ProbeScreen::boxed("list", ScreenId::ItemList, &journal));
    session.update().unwrap();
    session.take_refresh();

    press(&mut session, InputEvent::KeyPress('q'));
    session.context_mut().close_sub_screen();
    session.update().unwrap();
    press(&mut session, InputEvent::KeyPress('r'));

    let log = journal.borrow();
    assert!(log.contains(&"list got KeyPress('q')".to_string()));
    assert!(log.contains(&"play got KeyPress('r')".to_string()));
    assert!(!log.contains(&"play got KeyPress('q')".to_string()));
    assert!(session.take_refresh());
}

#[test]
fn unknown_keys_do_not_hand_over_the_turn() {
    let mut session = play_session(world_with(&[("ogre", 3)]));

    press(&mut session, InputEvent::char_down('z'));
    press(&mut session, InputEvent::KeyPress('z'));

    assert!(session.context().gate.is_locked());
    let game = session.context().game.as_ref().unwrap();
    let ogre = game.map.entity_at(Position::new(3, 1, 0));
    assert!(ogre.is_some(), "the ogre should not have moved");
}

#[test]
fn a_move_lets_the_world_take_one_turn() {
    let mut session = play_session(world_with(&[("ogre", 4)]));

    // walking into the wall still spends the turn
    press(&mut session, InputEvent::KeyDown(KeyCode::Left));

    let game = session.context().game.as_ref().unwrap();
    assert_eq!(game.map.position_of(game.player), Some(Position::new(1, 1, 0)));
    assert!(game.map.entity_at(Position::new(3, 1, 0)).is_some());
    assert!(session.context().gate.is_locked());
    assert!(!session.context().gate.is_cancelled());
}

#[test]
fn player_death_locks_play_until_enter() {
    let mut session = play_session(world_with(&[("ogre", 2)]));

    press(&mut session, InputEvent::KeyDown(KeyCode::Left));

    assert_eq!(player_health(&session), None);
    assert!(session.context().gate.is_cancelled());
    assert_eq!(session.screen_id(), Some(ScreenId::Play));

    let mut display = RecordingDisplay::new(40, 10);
    session.render(&mut display);
    assert!(display.contains_text("You have died"));

    press(&mut session, InputEvent::KeyDown(KeyCode::Right));
    press(&mut session, InputEvent::char_down('i'));
    assert_eq!(session.screen_id(), Some(ScreenId::Play));
    assert!(!session.has_sub_screen());

    press(&mut session, InputEvent::KeyDown(KeyCode::Enter));
    assert_eq!(session.screen_id(), Some(ScreenId::Lose));
    assert!(session.context().game.is_none());

    let mut display = RecordingDisplay::new(40, 24);
    session.render(&mut display);
    assert_eq!(display.row(1), "  You lose! :(");
}

#[test]
fn killing_the_last_monster_wins() {
    let mut session = play_session(world_with(&[("newt", 2)]));

    press(&mut session, InputEvent::KeyDown(KeyCode::Right));

    assert_eq!(player_health(&session), Some(40));
    assert!(session.context().gate.is_cancelled());
    let game = session.context().game.as_ref().unwrap();
    assert_eq!(game.map.items_at(Position::new(2, 1, 0))[0].describe(), "newt corpse");

    press(&mut session, InputEvent::KeyDown(KeyCode::Enter));
    assert_eq!(session.screen_id(), Some(ScreenId::Win));

    let mut display = RecordingDisplay::new(40, 24);
    session.render(&mut display);
    assert_eq!(display.row(5), "  You win!");
}

#[test]
fn ended_game_skips_an_open_sub_screen() {
    let mut session = play_session(world_with(&[("ogre", 2)]));
    {
        let game = session.context_mut().game.as_mut().unwrap();
        let player = game.player;
        let corpse = Item::corpse("rat", terminal_crawler::dungeon::Color::Gray);
        game.map
            .world
            .get::<&mut InventoryHolder>(player)
            .unwrap()
            .add(corpse)
            .unwrap();
    }

    // open the inventory, then let the ogre finish the player off
    press(&mut session, InputEvent::char_down('i'));
    assert!(session.has_sub_screen());
    session.context_mut().gate.unlock();
    session.update().unwrap();
    assert!(session.context().gate.is_cancelled());

    press(&mut session, InputEvent::KeyDown(KeyCode::Enter));
    assert_eq!(session.screen_id(), Some(ScreenId::Lose));
    assert!(!session.has_sub_screen());
}

/// Two floors joined by stairs at (1, 1), with an ogre waiting below.
fn two_floors(start: Position) -> GameWorld {
    let map = Map::new(Level::from_layers(&[
        &["#####", "#>..#", "#####"],
        &["#####", "#<..#", "#####"],
    ]));
    world_on(map, start, &[("ogre", Position::new(3, 1, 1))])
}

fn press_char(session: &mut Session, c: char) {
    press(session, InputEvent::char_down(c));
    press(session, InputEvent::KeyPress(c));
}

#[test]
fn stairs_take_the_player_down_and_spend_the_turn() {
    let mut session = play_session(two_floors(Position::new(1, 1, 0)));

    press_char(&mut session, '>');

    let game = session.context().game.as_ref().unwrap();
    assert_eq!(game.map.position_of(game.player), Some(Position::new(1, 1, 1)));
    // the ogre below saw the player arrive and stepped closer
    assert!(game.map.entity_at(Position::new(2, 1, 1)).is_some());
    assert!(session.context().gate.is_locked());
    assert!(!session.context().gate.is_cancelled());
}

#[test]
fn stairs_keys_do_nothing_away_from_stairs() {
    let mut session = play_session(two_floors(Position::new(2, 1, 0)));

    press_char(&mut session, '>');
    press_char(&mut session, '<');

    let game = session.context().game.as_ref().unwrap();
    assert_eq!(game.map.position_of(game.player), Some(Position::new(2, 1, 0)));
    assert!(game.map.entity_at(Position::new(3, 1, 1)).is_some());
}

#[test]
fn each_command_shows_only_its_own_messages() {
    let mut session = play_session(world_with(&[("newt", 6)]));
    {
        let game = session.context_mut().game.as_mut().unwrap();
        let player = game.player;
        game.map.send_message(player, "Welcome back.");
    }

    for _ in 0..3 {
        press(&mut session, InputEvent::char_down('g'));
    }

    let mut display = RecordingDisplay::new(40, 10);
    session.render(&mut display);
    let shown = (0..10)
        .filter(|y| display.row(*y).contains("nothing here to pick up"))
        .count();
    assert_eq!(shown, 1);
    assert!(!display.contains_text("Welcome"));
}

#[test]
fn only_the_latest_messages_are_drawn() {
    let mut session = play_session(world_with(&[("newt", 6)]));
    {
        let game = session.context_mut().game.as_mut().unwrap();
        let player = game.player;
        for i in 0..8 {
            game.map.send_message(player, format!("note {}", i));
        }
    }

    let mut display = RecordingDisplay::new(40, 10);
    session.render(&mut display);

    assert!(!display.contains_text("note 2"));
    assert!(display.row(0).starts_with("note 3"));
    assert!(display.row(MESSAGE_ROWS as i32 - 1).starts_with("note 7"));
}
