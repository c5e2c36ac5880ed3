//! A friends list grouped by favorite color, printed as table operations.
//!
//! Run with `RUST_LOG=set_controller=debug` to see the controller's own logs.

use std::sync::Arc;

use set_controller::prelude::*;
use set_controller::{ProjectionDebug, TreeFormatOptions, TreeStyle};
use tracing_subscriber::EnvFilter;

struct Friend {
    name: Property<String>,
    favorite_color: Property<Option<String>>,
}

impl Friend {
    fn new(name: &str, color: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            name: Property::new(name.to_string()),
            favorite_color: Property::new(color.map(str::to_string)),
        })
    }
}

impl Observable for Friend {
    fn observable_keys() -> &'static [&'static str] {
        &["name", "favorite_color"]
    }

    fn value_for_key(&self, key: &str) -> Option<Value> {
        match key {
            "name" => Some(Value::from(self.name.get())),
            "favorite_color" => Some(Value::from(self.favorite_color.get())),
            _ => None,
        }
    }

    fn key_signal(&self, key: &str) -> Option<&Signal<()>> {
        match key {
            "name" => Some(self.name.changed()),
            "favorite_color" => Some(self.favorite_color.changed()),
            _ => None,
        }
    }
}

struct Document {
    friends: ObservableSet<Friend>,
}

impl SetContainer<Friend> for Document {
    fn set_for_key(&self, key: &str) -> Option<&ObservableSet<Friend>> {
        (key == "friends").then_some(&self.friends)
    }
}

/// Prints the operations a table view would perform.
struct TablePrinter;

impl SetControllerDelegate<Friend> for TablePrinter {
    fn will_change_content(&self, _controller: &SetController<Friend>) {
        println!("beginUpdates");
    }

    fn did_change_section(
        &self,
        _controller: &SetController<Friend>,
        section: &SectionInfo<Friend>,
        index: usize,
        change_type: ChangeType,
    ) {
        let name = section.name().unwrap_or("(no color)");
        println!("  {change_type} section {index} \"{name}\"");
    }

    fn did_change_object(
        &self,
        _controller: &SetController<Friend>,
        friend: &Arc<Friend>,
        old_path: Option<IndexPath>,
        change_type: ChangeType,
        new_path: Option<IndexPath>,
    ) {
        let name = friend.name.get();
        match (old_path, new_path) {
            (Some(old), Some(new)) => println!("  {change_type} row {old} -> {new} {name}"),
            (Some(old), None) => println!("  {change_type} row {old} {name}"),
            (None, Some(new)) => println!("  {change_type} row {new} {name}"),
            (None, None) => {}
        }
    }

    fn did_change_content(&self, _controller: &SetController<Friend>) {
        println!("endUpdates");
    }

    fn controller_did_fail(&self, _controller: &SetController<Friend>, error: &SetControllerError) {
        eprintln!("controller failed: {error}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let ann = Friend::new("Ann", Some("blue"));
    let bob = Friend::new("Bob", Some("green"));
    let document = Arc::new(Document {
        friends: ObservableSet::with_members([ann.clone(), bob.clone()]),
    });

    let table = Arc::new(TablePrinter);
    let config = SetControllerConfig::new("friends")
        .observe("name")
        .section_key("favorite_color")
        .sort_by(SortDescriptor::ascending("favorite_color"))
        .sort_by(SortDescriptor::ascending("name"))
        .delegate(&table);

    let controller = SetController::new(&document, config)?;
    controller.perform_query()?;

    let tree = ProjectionDebug::new(|friend: &Friend| friend.name.get())
        .with_options(TreeFormatOptions::default().style(TreeStyle::Unicode));
    print!("{}", tree.format(&controller.projection()));

    println!("\n> Cy joins, likes blue");
    let cy = Friend::new("Cy", Some("blue"));
    document.friends.insert(cy.clone());

    println!("\n> Bob switches to blue");
    bob.favorite_color.set(Some("blue".to_string()));

    println!("\n> Ann is renamed Zoe");
    ann.name.set("Zoe".to_string());

    println!("\n> Cy leaves");
    document.friends.remove(&cy);

    println!();
    print!("{}", tree.format(&controller.projection()));

    controller.stop_observing();
    Ok(())
}
