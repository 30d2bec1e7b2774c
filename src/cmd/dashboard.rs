use anyhow::Result;

use taskdesk::app::App;
use taskdesk::guard::Route;
use taskdesk::ui::LoadingIndicator;
use taskdesk::views::DashboardView;

pub async fn cmd_dashboard(app: &App) -> Result<()> {
    app.enter(Route::Dashboard).await?;

    let mut view = DashboardView::new();
    let indicator = LoadingIndicator::start("Loading dashboard...");
    view.load(app.api()).await;
    indicator.finish();

    println!("{}", view.render());
    super::view_result(view.error(), "load dashboard")
}
