use std::sync::Arc;

use call::LocalCallWidget;
use settings::TuiSettings;
use state_store::StateStore;
use ui_management::UiManager;

pub use termination::{create_termination, Interrupted, Terminator};

mod call;
mod settings;
mod state_store;
mod termination;
mod ui_management;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = TuiSettings::load()?;
    settings::init_logger(&settings)?;

    let (terminator, mut interrupt_rx) = create_termination();
    let (state_store, state_rx) = StateStore::new(Arc::new(LocalCallWidget::default()), &settings);
    let (ui_manager, action_rx) = UiManager::new();

    log::info!(
        "starting as '{}' against the room store at {}",
        settings.display_name,
        settings.server_addr
    );

    tokio::try_join!(
        state_store.main_loop(terminator, action_rx, interrupt_rx.resubscribe()),
        ui_manager.main_loop(state_rx, interrupt_rx.resubscribe()),
    )?;

    if let Ok(reason) = interrupt_rx.recv().await {
        match reason {
            Interrupted::UserInt => println!("exited per user request"),
            Interrupted::OsSigInt => println!("exited because of an os sig int"),
        }
    } else {
        println!("exited because of an unexpected error");
    }

    Ok(())
}
