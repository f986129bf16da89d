use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use faultcanvas_core::constants::{LABEL_QUIET_PERIOD_MS, ROOT_NODE_ID};
use faultcanvas_core::{NodeId, NodeType, TreeKind};
use faultcanvas_events::{ContextMenuAction, LabelTarget, NotificationBus};
use faultcanvas_graph::outgoers;
use faultcanvas_session::TreeGraphSession;
use faultcanvas_storage::SqliteGraphStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(author, version, about = "Fault tree editor core, driven from the command line", long_about = None)]
struct Args {
    /// Path to the SQLite database
    #[arg(short, long, default_value = "faultcanvas.db")]
    db: PathBuf,

    /// Tree to operate on
    #[arg(short, long, default_value = "main")]
    tree: String,

    /// Diagram kind used when the tree does not exist yet
    #[arg(short, long, default_value = "fault-tree", value_parser = parse_tree_kind)]
    kind: TreeKind,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the tree (creates the starter tree if it does not exist)
    Show,
    /// List the trees stored in the database
    List,
    /// Change a node's type
    Retype {
        node: String,
        #[arg(value_parser = parse_node_type)]
        node_type: NodeType,
    },
    /// Append a basic event below a gate
    AddChild { node: String },
    /// Insert a NOT gate into the edge between two nodes
    InsertNot { source: String, target: String },
    /// Splice a node out of the tree
    DeleteNode {
        node: String,
        /// Branch to keep when deleting a gate under a NOT gate
        #[arg(long)]
        keep: Option<usize>,
    },
    /// Remove everything below a node
    DeleteSubtree { node: String },
    /// Set a node's label
    SetLabel { node: String, label: String },
}

fn parse_node_type(s: &str) -> Result<NodeType, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_tree_kind(s: &str) -> Result<TreeKind, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let store = Arc::new(SqliteGraphStore::open(&args.db)?);

    if let Command::List = args.command {
        for (tree_id, kind) in store.list_trees()? {
            println!("{tree_id}  ({kind})");
        }
        return Ok(());
    }

    let bus = NotificationBus::new();
    let mut session = TreeGraphSession::new(&args.tree, args.kind, store, bus.clone());
    session.load();

    match &args.command {
        Command::Show | Command::List => {}
        Command::Retype { node, node_type } => {
            let id = resolve_node(&session, node)?;
            session.handle_context_menu(
                &id,
                ContextMenuAction::Retype {
                    node_type: *node_type,
                },
            )?;
        }
        Command::AddChild { node } => {
            let id = resolve_node(&session, node)?;
            let kind = session
                .find_node(&id)
                .map(|n| n.node_type)
                .unwrap_or(NodeType::BasicEvent);
            if kind.is_leaf() || kind == NodeType::NotGate {
                bail!("{kind} nodes do not take extra children");
            }
            session.handle_double_click(&id)?;
        }
        Command::InsertNot { source, target } => {
            let source = resolve_node(&session, source)?;
            let target = resolve_node(&session, target)?;
            let Some(edge) = session
                .edges()
                .iter()
                .find(|edge| edge.source == source && edge.target == target)
            else {
                bail!("no edge {source} -> {target}");
            };
            let edge_id = edge.id.clone();
            session.handle_edge_click(&edge_id)?;
        }
        Command::DeleteNode { node, keep } => {
            let id = resolve_node(&session, node)?;
            session.handle_context_menu(&id, ContextMenuAction::DeleteNode)?;
            if session.is_subgraph_grayed() {
                resolve_branch_choice(&mut session, *keep)?;
            }
        }
        Command::DeleteSubtree { node } => {
            let id = resolve_node(&session, node)?;
            session.handle_context_menu(&id, ContextMenuAction::DeleteSubtree)?;
        }
        Command::SetLabel { node, label } => {
            let id = resolve_node(&session, node)?;
            let now = Instant::now();
            session.edit_label(LabelTarget::Node, &id.0, label, now);
            session.flush_labels(now + Duration::from_millis(LABEL_QUIET_PERIOD_MS));
        }
    }

    for notification in bus.drain() {
        eprintln!("{:?}: {}", notification.severity, notification.kind.message());
    }

    print_tree(&session);
    Ok(())
}

fn resolve_node(session: &TreeGraphSession, id: &str) -> Result<NodeId> {
    let node_id = NodeId::from(id);
    if session.find_node(&node_id).is_none() {
        bail!("no node {id} in tree {}", session.tree_id());
    }
    Ok(node_id)
}

/// An ambiguous deletion grayed the subtree; commit the chosen branch or
/// abandon and tell the user how to choose.
fn resolve_branch_choice(session: &mut TreeGraphSession, keep: Option<usize>) -> Result<()> {
    let Some(pending) = session.pending_proposal() else {
        return Ok(());
    };
    let branches = pending.branches.clone();
    match keep {
        Some(index) if index < branches.len() => {
            session.commit_branch(Some(&branches[index]))?;
            Ok(())
        }
        Some(index) => {
            session.abandon_proposal();
            bail!("--keep {index} is out of range, this gate has {} branches", branches.len());
        }
        None => {
            session.abandon_proposal();
            bail!(
                "deleting this gate would leave its NOT parent with {} children; \
                 rerun with --keep <0..{}> to pick the branch that survives",
                branches.len(),
                branches.len()
            );
        }
    }
}

fn print_tree(session: &TreeGraphSession) {
    let root = NodeId::from(ROOT_NODE_ID);
    if session.find_node(&root).is_none() {
        println!("(empty tree)");
        return;
    }
    print_node(session, &root, "", "");
}

fn print_node(session: &TreeGraphSession, id: &NodeId, lead: &str, child_lead: &str) {
    let Some(node) = session.find_node(id) else {
        return;
    };
    let label = node.data.label.as_deref().unwrap_or("");
    let grayed = if node.data.is_grayed { "  (grayed)" } else { "" };
    println!("{lead}{label} [{} {}]{grayed}", node.node_type, node.id);

    let children = outgoers(id, session.nodes(), session.edges());
    for (index, child) in children.iter().enumerate() {
        if index + 1 == children.len() {
            print_node(
                session,
                &child.id,
                &format!("{child_lead}└─ "),
                &format!("{child_lead}   "),
            );
        } else {
            print_node(
                session,
                &child.id,
                &format!("{child_lead}├─ "),
                &format!("{child_lead}│  "),
            );
        }
    }
}
