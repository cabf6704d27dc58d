//! Command table and verb handlers.
//!
//! Handlers run inside the coordinator loop with exclusive access to the
//! registry, so every broadcast sees the membership as of this command.

use std::collections::HashMap;

use super::registry::Registry;
use super::session::Session;
use super::types::{Direction, RoomId};
use super::world::World;

pub type Handler = fn(&mut CommandContext<'_>, &[String]);

/// Everything a handler may touch while it runs.
pub struct CommandContext<'a> {
    pub world: &'a World,
    pub registry: &'a mut Registry,
    pub actor: &'a str,
    pub table: &'a CommandTable,
}

impl CommandContext<'_> {
    pub fn actor(&self) -> Option<&Session> {
        self.registry.get(self.actor)
    }

    /// One line back to the acting player.
    pub fn reply(&self, text: &str) {
        if let Some(actor) = self.actor() {
            actor.send(text);
        }
    }
}

pub struct CommandTable {
    commands: HashMap<&'static str, Handler>,
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandTable {
    pub fn new() -> Self {
        let mut table = Self { commands: HashMap::new() };
        table.social_commands();
        table.directional_commands();
        table.info_commands();
        table
    }

    pub fn add(&mut self, keyword: &'static str, handler: Handler) {
        self.commands.insert(keyword, handler);
    }

    fn social_commands(&mut self) {
        self.add("smile", cmd_smile);
        self.add("laugh", cmd_laugh);
        self.add("gossip", cmd_gossip);
        self.add("say", cmd_say);
        self.add("tell", cmd_tell);
        self.add("shout", cmd_shout);
    }

    fn directional_commands(&mut self) {
        self.add("north", cmd_north);
        self.add("east", cmd_east);
        self.add("west", cmd_west);
        self.add("south", cmd_south);
        self.add("up", cmd_up);
        self.add("down", cmd_down);
        self.add("n", cmd_north);
        self.add("e", cmd_east);
        self.add("w", cmd_west);
        self.add("s", cmd_south);
        self.add("u", cmd_up);
        self.add("d", cmd_down);
        self.add("recall", cmd_recall);
    }

    fn info_commands(&mut self) {
        self.add("look", cmd_look);
        self.add("who", cmd_who);
        self.add("help", cmd_help);
    }

    /// Registered keywords, sorted.
    pub fn keywords(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self.commands.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Runs `tokens[0]` for `actor`. Unknown keywords get a single reply.
    pub fn execute(&self, world: &World, registry: &mut Registry, actor: &str, tokens: &[String]) {
        let Some((keyword, args)) = tokens.split_first() else {
            return;
        };
        let mut ctx = CommandContext { world, registry, actor, table: self };
        match self.commands.get(keyword.to_ascii_lowercase().as_str()) {
            Some(handler) => handler(&mut ctx, args),
            None => ctx.reply(&format!("[{}] Command not recognized\n", keyword)),
        }
    }
}

/// Full room view: name, description, exits and who is here.
pub fn room_view(world: &World, registry: &Registry, room: RoomId) -> String {
    let r = world.room(room);
    let mut present: Vec<&str> = registry.in_room(room).map(|s| s.name.as_str()).collect();
    present.sort_unstable();
    format!(
        "{}\n{}\n{}\nPlayers here: {}\n",
        r.name,
        r.description,
        world.exits_line(room),
        present.join(", ")
    )
}

// ============================================
// Social
// ============================================

fn cmd_smile(ctx: &mut CommandContext<'_>, _args: &[String]) {
    let Some(actor) = ctx.actor() else { return };
    ctx.registry.send_room(actor.room, None, &format!("{}: [Smiles]\n", actor.name));
}

fn cmd_laugh(ctx: &mut CommandContext<'_>, _args: &[String]) {
    let Some(actor) = ctx.actor() else { return };
    let zone = ctx.world.zone_of(actor.room);
    ctx.registry.send_zone(ctx.world, zone, &format!("{} [LOL]\n", actor.name));
}

fn cmd_gossip(ctx: &mut CommandContext<'_>, args: &[String]) {
    if args.is_empty() {
        ctx.reply("You have to type a message to gossip\n");
        return;
    }
    ctx.registry.send_all(&format!("{}:[Gossip] {}\n", ctx.actor, args.join(" ")));
}

fn cmd_say(ctx: &mut CommandContext<'_>, args: &[String]) {
    if args.is_empty() {
        ctx.reply("You must type a message to say to the room\n");
        return;
    }
    let Some(actor) = ctx.actor() else { return };
    ctx.registry.send_room(
        actor.room,
        None,
        &format!("{}:[Say] {}\n", actor.name, args.join(" ")),
    );
}

fn cmd_tell(ctx: &mut CommandContext<'_>, args: &[String]) {
    let [target, message @ ..] = args else {
        ctx.reply("You must type a player name and a message to use tell\n");
        return;
    };
    if message.is_empty() {
        ctx.reply("You must type a player name and a message to use tell\n");
        return;
    }
    match ctx.registry.get(target) {
        Some(other) => other.send(format!("{}:[Tell] {}\n", ctx.actor, message.join(" "))),
        None => ctx.reply(&format!("Player '{}' not found\n", target)),
    }
}

fn cmd_shout(ctx: &mut CommandContext<'_>, args: &[String]) {
    if args.is_empty() {
        ctx.reply("You must type a message to shout\n");
        return;
    }
    let Some(actor) = ctx.actor() else { return };
    let zone = ctx.world.zone_of(actor.room);
    ctx.registry.send_zone(
        ctx.world,
        zone,
        &format!("{}: [Shout] {}\n", actor.name, args.join(" ")),
    );
}

// ============================================
// Movement
// ============================================

fn go(ctx: &mut CommandContext<'_>, dir: Direction) {
    let Some(actor) = ctx.actor() else { return };
    let from = actor.room;
    let Some(to) = ctx.world.follow(from, dir) else {
        actor.send("You can't go that way\n");
        return;
    };

    let name = ctx.actor;
    ctx.registry.send_room(from, Some(name), &format!("{} went {}\n", name, dir.departure()));
    if let Some(actor) = ctx.registry.get_mut(name) {
        actor.room = to;
    }
    ctx.registry.send_room(to, Some(name), &format!("{} came from {}\n", name, dir.arrival()));
    ctx.reply(&room_view(ctx.world, ctx.registry, to));
}

fn cmd_north(ctx: &mut CommandContext<'_>, _args: &[String]) {
    go(ctx, Direction::North);
}

fn cmd_east(ctx: &mut CommandContext<'_>, _args: &[String]) {
    go(ctx, Direction::East);
}

fn cmd_west(ctx: &mut CommandContext<'_>, _args: &[String]) {
    go(ctx, Direction::West);
}

fn cmd_south(ctx: &mut CommandContext<'_>, _args: &[String]) {
    go(ctx, Direction::South);
}

fn cmd_up(ctx: &mut CommandContext<'_>, _args: &[String]) {
    go(ctx, Direction::Up);
}

fn cmd_down(ctx: &mut CommandContext<'_>, _args: &[String]) {
    go(ctx, Direction::Down);
}

fn cmd_recall(ctx: &mut CommandContext<'_>, _args: &[String]) {
    let Some(actor) = ctx.actor() else { return };
    let (from, home) = (actor.room, actor.home);
    let name = ctx.actor;
    ctx.registry.send_room(from, Some(name), &format!("{} recalled\n", name));
    if let Some(actor) = ctx.registry.get_mut(name) {
        actor.room = home;
    }
    ctx.reply(&room_view(ctx.world, ctx.registry, home));
}

// ============================================
// Information
// ============================================

fn cmd_look(ctx: &mut CommandContext<'_>, args: &[String]) {
    let Some(actor) = ctx.actor() else { return };
    let room = actor.room;
    let Some(word) = args.first() else {
        ctx.reply(&room_view(ctx.world, ctx.registry, room));
        return;
    };
    match Direction::parse(word) {
        Some(dir) => {
            let exit = ctx.world.room(room).exits.get(dir);
            if exit.is_open() {
                ctx.reply(&format!("{}\n", exit.description));
            } else {
                ctx.reply("There is no path that way.\n");
            }
        }
        None => ctx.reply(&format!("[{}] is not a direction\n", word)),
    }
}

fn cmd_who(ctx: &mut CommandContext<'_>, _args: &[String]) {
    let names = ctx.registry.names();
    ctx.reply(&format!("Players online ({}): {}\n", names.len(), names.join(", ")));
}

fn cmd_help(ctx: &mut CommandContext<'_>, _args: &[String]) {
    let keywords = ctx.table.keywords();
    ctx.reply(&format!("Commands: {} quit\n", keywords.join(" ")));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::session::SessionId;
    use tokio::sync::mpsc;

    /// Town zone: Square(3001) -north-> Gate(3002) -up-> Tower(3003).
    /// Forest zone: Glade(4001), reachable east of the Gate.
    fn world() -> World {
        let mut w = World::new();
        w.add_zone(30, "Town").unwrap();
        w.add_zone(40, "Forest").unwrap();
        w.add_room(3001, 30, "Square", "A busy square.").unwrap();
        w.add_room(3002, 30, "Gate", "The north gate.").unwrap();
        w.add_room(3003, 30, "Tower", "Wind howls.").unwrap();
        w.add_room(4001, 40, "Glade", "Quiet trees.").unwrap();
        w.set_exit(3001, Direction::North, 3002, "The gate looms").unwrap();
        w.set_exit(3002, Direction::South, 3001, "The square").unwrap();
        w.set_exit(3002, Direction::Up, 3003, "A ladder").unwrap();
        w.set_exit(3003, Direction::Down, 3002, "The ladder down").unwrap();
        w.set_exit(3002, Direction::East, 4001, "A forest path").unwrap();
        w.set_exit(4001, Direction::West, 3002, "The town gate").unwrap();
        // wired but closed: empty description
        w.set_exit(3001, Direction::West, 4001, "").unwrap();
        w
    }

    struct Harness {
        world: World,
        registry: Registry,
        table: CommandTable,
        inboxes: HashMap<String, mpsc::UnboundedReceiver<String>>,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                world: world(),
                registry: Registry::new(),
                table: CommandTable::new(),
                inboxes: HashMap::new(),
            }
        }

        fn join(&mut self, name: &str, room: i64) {
            let (tx, rx) = mpsc::unbounded_channel();
            let id = SessionId(self.inboxes.len() as u64 + 1);
            let start = self.world.find_room(3001).unwrap();
            let mut session = Session::new(id, name, start, tx);
            session.room = self.world.find_room(room).unwrap();
            self.registry.insert(session);
            self.inboxes.insert(name.to_string(), rx);
        }

        fn run(&mut self, actor: &str, line: &str) {
            let tokens: Vec<String> = line.split_whitespace().map(String::from).collect();
            self.table.execute(&self.world, &mut self.registry, actor, &tokens);
        }

        fn drain(&mut self, name: &str) -> Vec<String> {
            let rx = self.inboxes.get_mut(name).unwrap();
            let mut out = Vec::new();
            while let Ok(msg) = rx.try_recv() {
                out.push(msg);
            }
            out
        }

        fn room_of(&self, name: &str) -> i64 {
            self.world.room(self.registry.get(name).unwrap().room).id
        }
    }

    #[test]
    fn test_move_north_announces_both_sides() {
        let mut h = Harness::new();
        h.join("A", 3001);
        h.join("B", 3001);
        h.join("C", 3002);

        h.run("A", "north");

        assert_eq!(h.room_of("A"), 3002);
        assert_eq!(h.drain("B"), vec!["A went North\n"]);
        assert_eq!(h.drain("C"), vec!["A came from the South\n"]);
        let a_out = h.drain("A");
        assert_eq!(a_out.len(), 1);
        assert!(a_out[0].contains("The north gate."));
        assert!(a_out[0].contains("Players here: A, C"));
    }

    #[test]
    fn test_blocked_direction_changes_nothing() {
        let mut h = Harness::new();
        h.join("A", 3001);
        h.join("B", 3001);

        h.run("A", "e");
        assert_eq!(h.room_of("A"), 3001);
        assert_eq!(h.drain("A"), vec!["You can't go that way\n"]);
        assert!(h.drain("B").is_empty());

        // west is wired to a room but has an empty description
        h.run("A", "west");
        assert_eq!(h.room_of("A"), 3001);
        assert_eq!(h.drain("A"), vec!["You can't go that way\n"]);
    }

    #[test]
    fn test_east_and_west_go_the_right_way() {
        let mut h = Harness::new();
        h.join("A", 3002);
        h.run("A", "east");
        assert_eq!(h.room_of("A"), 4001);
        h.run("A", "w");
        assert_eq!(h.room_of("A"), 3002);
    }

    #[test]
    fn test_up_and_down_announce() {
        let mut h = Harness::new();
        h.join("A", 3002);
        h.join("B", 3003);
        h.run("A", "UP");
        assert_eq!(h.room_of("A"), 3003);
        assert_eq!(h.drain("B"), vec!["A came from below\n"]);
    }

    #[test]
    fn test_say_reaches_room_only() {
        let mut h = Harness::new();
        h.join("A", 3001);
        h.join("B", 3001);
        h.join("C", 3002);

        h.run("A", "say hello   there");

        assert_eq!(h.drain("A"), vec!["A:[Say] hello there\n"]);
        assert_eq!(h.drain("B"), vec!["A:[Say] hello there\n"]);
        assert!(h.drain("C").is_empty());
    }

    #[test]
    fn test_say_without_message_is_rejected() {
        let mut h = Harness::new();
        h.join("A", 3001);
        h.join("B", 3001);
        h.run("A", "say");
        assert_eq!(h.drain("A").len(), 1);
        assert!(h.drain("B").is_empty());
    }

    #[test]
    fn test_smile_reaches_room_only() {
        let mut h = Harness::new();
        h.join("A", 3001);
        h.join("B", 3002);
        h.run("A", "smile");
        assert_eq!(h.drain("A"), vec!["A: [Smiles]\n"]);
        assert!(h.drain("B").is_empty());
    }

    #[test]
    fn test_shout_and_laugh_reach_zone_only() {
        let mut h = Harness::new();
        h.join("A", 3001);
        h.join("B", 3003);
        h.join("C", 4001);

        h.run("A", "shout fire!");
        assert_eq!(h.drain("A"), vec!["A: [Shout] fire!\n"]);
        assert_eq!(h.drain("B"), vec!["A: [Shout] fire!\n"]);
        assert!(h.drain("C").is_empty());

        h.run("A", "laugh");
        assert_eq!(h.drain("B"), vec!["A [LOL]\n"]);
        assert!(h.drain("C").is_empty());
    }

    #[test]
    fn test_gossip_reaches_everyone() {
        let mut h = Harness::new();
        h.join("A", 3001);
        h.join("B", 3003);
        h.join("C", 4001);
        h.run("C", "gossip anyone around?");
        for name in ["A", "B", "C"] {
            assert_eq!(h.drain(name), vec!["C:[Gossip] anyone around?\n"]);
        }
    }

    #[test]
    fn test_tell_reaches_only_target() {
        let mut h = Harness::new();
        h.join("A", 3001);
        h.join("B", 4001);
        h.join("C", 3001);

        h.run("A", "tell B meet me at the gate");
        assert_eq!(h.drain("B"), vec!["A:[Tell] meet me at the gate\n"]);
        assert!(h.drain("A").is_empty());
        assert!(h.drain("C").is_empty());
    }

    #[test]
    fn test_tell_unknown_player() {
        let mut h = Harness::new();
        h.join("A", 3001);
        h.run("A", "tell Zed hi");
        assert_eq!(h.drain("A"), vec!["Player 'Zed' not found\n"]);

        h.run("A", "tell Zed");
        assert_eq!(h.drain("A").len(), 1);
    }

    #[test]
    fn test_recall_goes_home() {
        let mut h = Harness::new();
        h.join("A", 3003);
        h.join("B", 3003);
        h.run("A", "recall");
        assert_eq!(h.room_of("A"), 3001);
        assert_eq!(h.drain("B"), vec!["A recalled\n"]);
        assert!(h.drain("A")[0].contains("A busy square."));
    }

    #[test]
    fn test_look_direction() {
        let mut h = Harness::new();
        h.join("A", 3001);
        h.run("A", "look north");
        assert_eq!(h.drain("A"), vec!["The gate looms\n"]);
        h.run("A", "look up");
        assert_eq!(h.drain("A"), vec!["There is no path that way.\n"]);
        h.run("A", "look sideways");
        assert_eq!(h.drain("A"), vec!["[sideways] is not a direction\n"]);
    }

    #[test]
    fn test_unknown_command() {
        let mut h = Harness::new();
        h.join("A", 3001);
        h.join("B", 3001);
        h.run("A", "dance wildly");
        assert_eq!(h.drain("A"), vec!["[dance] Command not recognized\n"]);
        assert!(h.drain("B").is_empty());
    }

    #[test]
    fn test_who_and_help() {
        let mut h = Harness::new();
        h.join("B", 3001);
        h.join("A", 4001);
        h.run("A", "who");
        assert_eq!(h.drain("A"), vec!["Players online (2): A, B\n"]);

        h.run("A", "help");
        let help = h.drain("A");
        assert!(help[0].contains("gossip"));
        assert!(help[0].contains("recall"));
    }
}
