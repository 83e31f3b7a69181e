//! Operator Commands
//!
//! Text command surface over the console. Every handler returns
//! `Result<String, String>`: the text to show the operator, or the error
//! message to show instead.

use std::fmt::Write as _;
use std::str::FromStr;

use crate::logic::console::{ClickOutcome, Console};
use crate::logic::editor::EditorState;
use crate::logic::scene::terrain::BLOCK_HIGHLIGHT_COLOR;
use crate::logic::scene::PointerEvent;
use crate::logic::session::SessionContext;
use crate::logic::threat::{Severity, Threat, ThreatId, ThreatType};

pub const HELP: &str = "\
Session:   login <user> <pass> | register <user> <pass> <confirm> | logout | whoami
Threats:   load | list | stats | select <id> | show | close
Scene:     place [on|off] | click <px> <py> | hover <px> <py>
           orbit <dyaw> <dpolar> | zoom <delta> | pan <dx> <dz> | frame | terrain
Editor:    edit | cancel | set-type <name> | set-severity <level>
           set-description <text> | mark-resolved [on|off] | notes <text>
           save | confirm | delete
Other:     drones | detect [start|stop] | notices | help | quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Login { username: String, password: String },
    Register { username: String, password: String, confirm: String },
    Logout,
    WhoAmI,
    Load,
    List,
    Place(Option<bool>),
    Click(PointerEvent),
    Hover(PointerEvent),
    Orbit { yaw: f32, polar: f32 },
    Zoom(f32),
    Pan { dx: f32, dz: f32 },
    Select(ThreatId),
    Show,
    Edit,
    Cancel,
    SetType(ThreatType),
    SetSeverity(Severity),
    SetDescription(String),
    MarkResolved(Option<bool>),
    Notes(String),
    Save,
    Confirm,
    Delete,
    Close,
    Frame,
    Terrain,
    Stats,
    Drones,
    Detect(Option<bool>),
    Notices,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();
        let args: Vec<&str> = rest.split_whitespace().collect();

        let command = match name.to_lowercase().as_str() {
            "login" => match args.as_slice() {
                [username, password] => Command::Login {
                    username: username.to_string(),
                    password: password.to_string(),
                },
                _ => return Err("usage: login <user> <pass>".to_string()),
            },
            "register" => match args.as_slice() {
                [username, password, confirm] => Command::Register {
                    username: username.to_string(),
                    password: password.to_string(),
                    confirm: confirm.to_string(),
                },
                _ => return Err("usage: register <user> <pass> <confirm>".to_string()),
            },
            "logout" => Command::Logout,
            "whoami" => Command::WhoAmI,
            "load" => Command::Load,
            "list" | "ls" => Command::List,
            "place" => Command::Place(parse_switch(&args, "on", "off")?),
            "click" => Command::Click(parse_pointer(&args)?),
            "hover" => Command::Hover(parse_pointer(&args)?),
            "orbit" => {
                let [yaw, polar] = parse_floats::<2>(&args)?;
                Command::Orbit { yaw, polar }
            }
            "zoom" => Command::Zoom(parse_floats::<1>(&args)?[0]),
            "pan" => {
                let [dx, dz] = parse_floats::<2>(&args)?;
                Command::Pan { dx, dz }
            }
            "select" => match args.as_slice() {
                [id] => Command::Select(ThreatId::new(*id)),
                _ => return Err("usage: select <id>".to_string()),
            },
            "show" => Command::Show,
            "edit" => Command::Edit,
            "cancel" => Command::Cancel,
            "set-type" => Command::SetType(rest.parse()?),
            "set-severity" => Command::SetSeverity(rest.parse()?),
            "set-description" => Command::SetDescription(rest.to_string()),
            "mark-resolved" => Command::MarkResolved(parse_switch(&args, "on", "off")?),
            "notes" => Command::Notes(rest.to_string()),
            "save" => Command::Save,
            "confirm" => Command::Confirm,
            "delete" => Command::Delete,
            "close" => Command::Close,
            "frame" => Command::Frame,
            "terrain" => Command::Terrain,
            "stats" => Command::Stats,
            "drones" => Command::Drones,
            "detect" => Command::Detect(parse_switch(&args, "start", "stop")?),
            "notices" => Command::Notices,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            "" => return Err("empty command".to_string()),
            other => return Err(format!("unknown command '{}', try 'help'", other)),
        };
        Ok(command)
    }
}

fn parse_switch(args: &[&str], on: &str, off: &str) -> Result<Option<bool>, String> {
    match args {
        [] => Ok(None),
        [arg] if arg.eq_ignore_ascii_case(on) => Ok(Some(true)),
        [arg] if arg.eq_ignore_ascii_case(off) => Ok(Some(false)),
        _ => Err(format!("expected '{}' or '{}'", on, off)),
    }
}

fn parse_floats<const N: usize>(args: &[&str]) -> Result<[f32; N], String> {
    if args.len() != N {
        return Err(format!("expected {} numeric argument(s)", N));
    }
    let mut values = [0.0; N];
    for (slot, arg) in values.iter_mut().zip(args) {
        *slot = arg
            .parse()
            .map_err(|_| format!("'{}' is not a number", arg))?;
    }
    Ok(values)
}

fn parse_pointer(args: &[&str]) -> Result<PointerEvent, String> {
    let [x, y] = parse_floats::<2>(args)?;
    Ok(PointerEvent::new(x, y))
}

/// Console plus the operator session it runs under
pub struct CommandContext {
    pub console: Console,
    pub session: SessionContext,
}

impl CommandContext {
    pub fn new(console: Console, session: SessionContext) -> Self {
        Self { console, session }
    }
}

/// Run one command. `Quit` is the caller's to handle.
pub async fn execute(ctx: &mut CommandContext, command: Command) -> Result<String, String> {
    match command {
        Command::Login { username, password } => login(ctx, &username, &password).await,
        Command::Register { username, password, confirm } => {
            ctx.session
                .register(&username, &password, &confirm)
                .await
                .map_err(|e| ctx.console.report(e).to_string())
        }
        Command::Logout => {
            ctx.session.logout();
            ctx.console.reset_session();
            Ok("Logged out".to_string())
        }
        Command::WhoAmI => Ok(match ctx.session.username() {
            Some(username) => format!("Logged in as {}", username),
            None => "Not logged in".to_string(),
        }),
        Command::Load => load_threats(&mut ctx.console).await,
        Command::List => Ok(list_threats(&ctx.console)),
        Command::Place(switch) => {
            let active = match switch {
                Some(active) => {
                    ctx.console.set_placement_mode(active);
                    active
                }
                None => ctx.console.toggle_placement_mode(),
            };
            Ok(format!("Placement mode {}", if active { "on" } else { "off" }))
        }
        Command::Click(pointer) => click(&mut ctx.console, pointer).await,
        Command::Hover(pointer) => Ok(match ctx.console.hover(pointer) {
            Some(id) => format!("Hovering {}", id),
            None => "Nothing under pointer".to_string(),
        }),
        Command::Orbit { yaw, polar } => {
            let camera = ctx.console.surface_mut().camera_mut();
            camera.orbit(yaw, polar);
            Ok(format!("Polar {:.3} rad", camera.polar()))
        }
        Command::Zoom(delta) => {
            let camera = ctx.console.surface_mut().camera_mut();
            camera.zoom(delta);
            Ok(format!("Distance {:.1}", camera.distance()))
        }
        Command::Pan { dx, dz } => {
            let camera = ctx.console.surface_mut().camera_mut();
            camera.pan(dx, dz);
            let target = camera.target();
            Ok(format!("Target ({:.1}, {:.1})", target.x, target.z))
        }
        Command::Select(id) => {
            ctx.console.select(&id).map_err(|e| e.to_string())?;
            Ok(show_editor(&ctx.console))
        }
        Command::Show => Ok(show_editor(&ctx.console)),
        Command::Edit => edit_step(ctx, |editor| editor.begin_edit()),
        Command::Cancel => {
            let editor = ctx.console.editor_mut().ok_or("No threat selected")?;
            editor.cancel_edit();
            Ok(show_editor(&ctx.console))
        }
        Command::SetType(threat_type) => edit_step(ctx, |editor| editor.set_type(threat_type)),
        Command::SetSeverity(severity) => edit_step(ctx, |editor| editor.set_severity(severity)),
        Command::SetDescription(text) => edit_step(ctx, |editor| editor.set_description(text)),
        Command::MarkResolved(switch) => edit_step(ctx, |editor| {
            let resolved = match (switch, editor.state()) {
                (Some(resolved), _) => resolved,
                (None, EditorState::Editing(staged)) => !staged.resolved,
                (None, _) => false,
            };
            editor.mark_resolved(resolved)
        }),
        Command::Notes(text) => edit_step(ctx, |editor| editor.set_resolution_notes(text)),
        Command::Save => ctx
            .console
            .save()
            .await
            .map(|threat| format!("Saved {}", threat.id))
            .map_err(|e| e.to_string()),
        Command::Confirm => ctx
            .console
            .confirm_resolution()
            .await
            .map(|id| format!("Threat {} resolved and removed", id))
            .map_err(|e| e.to_string()),
        Command::Delete => ctx
            .console
            .delete_selected()
            .await
            .map(|id| format!("Threat {} deleted", id))
            .map_err(|e| e.to_string()),
        Command::Close => Ok(if ctx.console.close_editor() {
            "Editor closed".to_string()
        } else {
            "No threat selected".to_string()
        }),
        Command::Frame => serde_json::to_string_pretty(&ctx.console.frame()).map_err(|e| e.to_string()),
        Command::Terrain => Ok(terrain(&ctx.console)),
        Command::Stats => Ok(stats(&ctx.console)),
        Command::Drones => Ok(ctx
            .console
            .drones()
            .iter()
            .map(|drone| drone.to_string())
            .collect::<Vec<_>>()
            .join("\n")),
        Command::Detect(switch) => detect(&mut ctx.console, switch).await,
        Command::Notices => Ok(notices(&ctx.console)),
        Command::Help => Ok(HELP.to_string()),
        Command::Quit => Ok("Bye".to_string()),
    }
}

async fn login(ctx: &mut CommandContext, username: &str, password: &str) -> Result<String, String> {
    let greeting = match ctx.session.login(username, password).await {
        Ok(session) => format!("Welcome, {}", session.username),
        Err(e) => return Err(ctx.console.report(e).to_string()),
    };
    // A fresh session starts from the authority's current collection
    ctx.console.reset_session();
    match load_threats(&mut ctx.console).await {
        Ok(loaded) => Ok(format!("{}\n{}", greeting, loaded)),
        Err(e) => Ok(format!("{}\nCould not load threats: {} (retry with 'load')", greeting, e)),
    }
}

async fn load_threats(console: &mut Console) -> Result<String, String> {
    let count = console.load().await.map_err(|e| e.to_string())?;
    Ok(format!("Loaded {} threat(s)", count))
}

async fn click(console: &mut Console, pointer: PointerEvent) -> Result<String, String> {
    match console.click(pointer).await.map_err(|e| e.to_string())? {
        ClickOutcome::Selected(_) => Ok(show_editor(console)),
        ClickOutcome::Created(threat) => Ok(format!("Created\n{}", describe(&threat))),
        ClickOutcome::Ignored => Ok("Nothing to do here".to_string()),
    }
}

async fn detect(console: &mut Console, switch: Option<bool>) -> Result<String, String> {
    let running = switch.unwrap_or(!console.detection_running());
    console.set_detection(running).await.map_err(|e| e.to_string())?;
    if running {
        let feed = console.video_feed_url().unwrap_or_default();
        Ok(format!("Detection started, feed at {}", feed))
    } else {
        Ok("Detection stopped".to_string())
    }
}

/// Apply a synchronous editor step; failures also land in the notices
fn edit_step<F>(ctx: &mut CommandContext, step: F) -> Result<String, String>
where
    F: FnOnce(&mut crate::logic::editor::ThreatEditor) -> crate::logic::error::ConsoleResult<()>,
{
    let editor = ctx.console.editor_mut().ok_or("No threat selected")?;
    if let Err(e) = step(editor) {
        return Err(ctx.console.report(e).to_string());
    }
    Ok(show_editor(&ctx.console))
}

fn list_threats(console: &Console) -> String {
    let threats = console.store().snapshot();
    if threats.is_empty() {
        return "No active threats".to_string();
    }
    threats
        .iter()
        .map(|t| {
            format!(
                "{:>8}  {:<8} {:<26} {:<4} {}",
                t.id, t.severity, t.threat_type, t.sector.to_string(), t.position
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn describe(threat: &Threat) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Threat {}", threat.id);
    let _ = writeln!(out, "  type:        {}", threat.threat_type);
    let _ = writeln!(out, "  severity:    {}", threat.severity);
    let _ = writeln!(out, "  sector:      {}", threat.sector);
    let _ = writeln!(out, "  position:    {}", threat.position);
    let _ = writeln!(out, "  drone:       DRONE-{:02}", threat.assigned_drone);
    let _ = writeln!(out, "  reported:    {}", threat.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    let _ = write!(out, "  description: {}", threat.description);
    out
}

fn show_editor(console: &Console) -> String {
    let Some(editor) = console.editor() else {
        return "No threat selected".to_string();
    };

    let mut out = describe(editor.threat());
    let _ = write!(out, "\n  [{}]", editor.state().name());
    match editor.state() {
        EditorState::Viewing => {}
        EditorState::Editing(staged) | EditorState::ConfirmingResolution(staged) => {
            let _ = write!(
                out,
                "\n  staged: {} / {} / \"{}\"",
                staged.threat_type, staged.severity, staged.description
            );
            if staged.resolved {
                let _ = write!(out, "\n  resolution notes: \"{}\"", staged.resolution_notes);
            }
        }
    }
    if let Some(err) = editor.last_error() {
        let _ = write!(out, "\n  error: {}", err);
    }
    out
}

fn terrain(console: &Console) -> String {
    let terrain = console.surface().terrain();
    let highlighted = terrain
        .blocks()
        .iter()
        .filter(|b| b.color == BLOCK_HIGHLIGHT_COLOR)
        .count();
    let tallest = terrain.tallest().map(|b| b.height).unwrap_or_default();
    format!(
        "Blocks: {} ({} highlighted, {} plain)\nTallest: {:.2}",
        terrain.len(),
        highlighted,
        terrain.len() - highlighted,
        tallest
    )
}

fn stats(console: &Console) -> String {
    let analysis = console.analysis();
    let mut out = format!("Active threats: {}", analysis.active);
    for severity in Severity::ALL {
        let _ = write!(out, "\n  {:<8} {}", severity, analysis.count(severity));
    }
    let _ = write!(
        out,
        "\nPlacement mode: {}",
        if console.surface().placement_mode() { "on" } else { "off" }
    );
    out
}

fn notices(console: &Console) -> String {
    let lines: Vec<String> = console
        .notices()
        .map(|n| format!("{} [{}] {}", n.at.format("%H:%M:%S"), n.kind, n.message))
        .collect();
    if lines.is_empty() {
        "No notices".to_string()
    } else {
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::logic::console::ConsoleOptions;
    use crate::logic::demo_data::RandomDemoData;
    use crate::logic::remote::memory::RemoteOp;
    use crate::logic::remote::{ApiError, MemoryRemote};
    use crate::logic::scene::{SceneSurface, Terrain, Viewport};
    use crate::logic::session::SessionStorage;
    use crate::logic::store::ThreatStore;
    use crate::logic::threat::GroundPosition;

    fn context(dir: &tempfile::TempDir) -> (Arc<MemoryRemote>, CommandContext) {
        let remote = Arc::new(
            MemoryRemote::new()
                .starting_at(42)
                .with_user("op", "secret")
                .with_user("other", "hunter2"),
        );
        let store = ThreatStore::new(remote.clone());
        let surface = SceneSurface::new(
            Viewport::new(1280.0, 720.0),
            Terrain::generate(&mut RandomDemoData::seeded(1)),
        );
        let console = Console::new(store, surface, Box::new(RandomDemoData::seeded(2)), ConsoleOptions::default());
        let session = SessionContext::new(remote.clone(), SessionStorage::new(dir.path().join("s.json")));
        (remote, CommandContext::new(console, session))
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("place on".parse::<Command>(), Ok(Command::Place(Some(true))));
        assert_eq!("place".parse::<Command>(), Ok(Command::Place(None)));
        assert_eq!(
            "click 640 360".parse::<Command>(),
            Ok(Command::Click(PointerEvent::new(640.0, 360.0)))
        );
        assert_eq!(
            "set-type security breach".parse::<Command>(),
            Ok(Command::SetType(ThreatType::SecurityBreach))
        );
        assert_eq!(
            "notes  handled by team ".parse::<Command>(),
            Ok(Command::Notes("handled by team".to_string()))
        );
        assert_eq!("mark-resolved".parse::<Command>(), Ok(Command::MarkResolved(None)));
        assert_eq!("mark-resolved off".parse::<Command>(), Ok(Command::MarkResolved(Some(false))));
        assert_eq!("terrain".parse::<Command>(), Ok(Command::Terrain));
        assert!("mark-resolved maybe".parse::<Command>().is_err());
        assert!("click 1".parse::<Command>().is_err());
        assert!("zoom far".parse::<Command>().is_err());
        assert!("launch".parse::<Command>().is_err());
    }

    #[tokio::test]
    async fn test_login_place_click_resolve() {
        let dir = tempfile::tempdir().unwrap();
        let (remote, mut ctx) = context(&dir);

        let out = execute(&mut ctx, "login op secret".parse().unwrap()).await.unwrap();
        assert!(out.contains("Welcome, op"));

        execute(&mut ctx, Command::Place(Some(true))).await.unwrap();
        let pointer = ctx.console.surface().screen_position(GroundPosition::new(3.0, -1.5));
        let out = execute(&mut ctx, Command::Click(pointer)).await.unwrap();
        assert!(out.contains("Threat 42"));
        assert!(ctx.console.editor().is_some());

        for line in ["edit", "mark-resolved", "notes handled by team"] {
            execute(&mut ctx, line.parse().unwrap()).await.unwrap();
        }
        let out = execute(&mut ctx, Command::Confirm).await.unwrap();
        assert!(out.contains("42"));
        assert!(remote.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_editor_commands_need_selection() {
        let dir = tempfile::tempdir().unwrap();
        let (_, mut ctx) = context(&dir);

        assert!(execute(&mut ctx, Command::Edit).await.is_err());
        assert!(execute(&mut ctx, Command::Save).await.is_err());
        assert_eq!(execute(&mut ctx, Command::Show).await.unwrap(), "No threat selected");
    }

    #[tokio::test]
    async fn test_logout_forgets_previous_operator() {
        let dir = tempfile::tempdir().unwrap();
        let (remote, mut ctx) = context(&dir);

        execute(&mut ctx, "login op secret".parse().unwrap()).await.unwrap();
        execute(&mut ctx, Command::Place(Some(true))).await.unwrap();
        let pointer = ctx.console.surface().screen_position(GroundPosition::new(3.0, -1.5));
        execute(&mut ctx, Command::Click(pointer)).await.unwrap();
        assert_eq!(ctx.console.store().len(), 1);

        assert_eq!(execute(&mut ctx, Command::Logout).await.unwrap(), "Logged out");
        assert!(ctx.console.store().is_empty());
        assert!(ctx.console.frame().markers.is_empty());
        assert!(ctx.console.editor().is_none());
        assert!(!ctx.console.surface().placement_mode());
        assert_eq!(execute(&mut ctx, Command::List).await.unwrap(), "No active threats");

        remote.fail_next(RemoteOp::List, ApiError::Network("down".to_string()));
        let out = execute(&mut ctx, "login other hunter2".parse().unwrap()).await.unwrap();
        assert!(out.contains("Welcome, other"));
        assert!(out.contains("Could not load threats"));
        assert_eq!(ctx.session.username(), Some("other"));
        assert!(ctx.console.store().is_empty());

        let out = execute(&mut ctx, Command::Load).await.unwrap();
        assert_eq!(out, "Loaded 1 threat(s)");
    }

    #[tokio::test]
    async fn test_mark_resolved_switches_back_and_forth() {
        let dir = tempfile::tempdir().unwrap();
        let (_, mut ctx) = context(&dir);
        execute(&mut ctx, "login op secret".parse().unwrap()).await.unwrap();
        execute(&mut ctx, Command::Place(Some(true))).await.unwrap();
        let pointer = ctx.console.surface().screen_position(GroundPosition::new(-2.0, 4.0));
        execute(&mut ctx, Command::Click(pointer)).await.unwrap();

        let staged_resolved = |ctx: &CommandContext| match ctx.console.editor().unwrap().state() {
            EditorState::Editing(staged) | EditorState::ConfirmingResolution(staged) => staged.resolved,
            EditorState::Viewing => panic!("editor left staging"),
        };

        execute(&mut ctx, Command::Edit).await.unwrap();
        execute(&mut ctx, "mark-resolved".parse().unwrap()).await.unwrap();
        assert!(staged_resolved(&ctx));
        execute(&mut ctx, "mark-resolved".parse().unwrap()).await.unwrap();
        assert!(!staged_resolved(&ctx));

        execute(&mut ctx, "mark-resolved on".parse().unwrap()).await.unwrap();
        execute(&mut ctx, "notes handled".parse().unwrap()).await.unwrap();
        assert_eq!(ctx.console.editor().unwrap().state().name(), "confirming-resolution");

        execute(&mut ctx, "mark-resolved off".parse().unwrap()).await.unwrap();
        assert!(!staged_resolved(&ctx));
        assert!(execute(&mut ctx, Command::Save).await.is_ok());
    }

    #[tokio::test]
    async fn test_terrain_command_reports_block_field() {
        let dir = tempfile::tempdir().unwrap();
        let (_, mut ctx) = context(&dir);

        let out = execute(&mut ctx, Command::Terrain).await.unwrap();
        assert!(out.starts_with("Blocks: 900 ("));

        let frame: serde_json::Value =
            serde_json::from_str(&execute(&mut ctx, Command::Frame).await.unwrap()).unwrap();
        assert_eq!(frame["blocks"].as_array().unwrap().len(), 900);
    }
}
