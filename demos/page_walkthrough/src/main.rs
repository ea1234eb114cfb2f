use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use vitrine_core::{FileStorage, ManualClock, Size};
use vitrine_page::{
    Dirty, Field, MotionParams, PageConfig, PageLayout, PageShell, SectionId, SubmitStatus,
};

const FRAME: Duration = Duration::from_millis(16);

/// Advances the clock frame by frame, logging whatever each frame touched.
fn run_for(shell: &mut PageShell, clock: &ManualClock, total: Duration) {
    let mut elapsed = Duration::ZERO;
    while elapsed < total {
        clock.advance(FRAME);
        elapsed += FRAME;
        let dirty = shell.tick();
        if !dirty.is_empty() {
            log::debug!("frame +{:?}: {:?}", elapsed, dirty);
        }
    }
}

fn report(shell: &PageShell) {
    let y = shell.viewport().scroll_y();
    for section in shell.sections() {
        let p = section.motion_params();
        log::info!(
            "  {:<8} progress={:.2} offset_y={:>7.1} opacity={:.2} rotation={:>5.1}",
            section.id().anchor(),
            section.progress(),
            p.offset_y,
            p.opacity,
            p.rotation_deg
        );
    }
    log::info!(
        "  scroll_y={y:.0} nav_scrolled={:?} theme={}",
        shell.nav().map(|n| n.is_scrolled()),
        shell.theme()
    );
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => PageConfig::from_path(&path)
            .with_context(|| format!("loading page config from {path}"))?,
        None => PageConfig::default(),
    };
    let storage = FileStorage::new(std::env::temp_dir().join("vitrine-walkthrough.json"));

    let clock = ManualClock::default();
    let layout = PageLayout::standard(Size::new(1280.0, 800.0));
    let mut shell = PageShell::new(config, Rc::new(clock.clone()), storage, layout)
        .context("building page shell")?
        .with_ornament(SectionId::Contact, |p: &MotionParams| {
            log::trace!("envelope rotation {:.1}°", p.rotation_deg);
        });

    let splash = shell.config().loading_delay();
    let pan = shell.config().smooth_scroll();
    let round_trip = shell.config().submit_delay();

    log::info!("splash (loading={})", shell.is_loading());
    run_for(&mut shell, &clock, splash + FRAME);
    log::info!("mounted (loading={})", shell.is_loading());
    report(&shell);

    for y in [400.0, 1046.0, 2400.0, 3398.0] {
        let dirty = shell.scroll_to(y);
        log::info!("scroll to {y}: {dirty:?}");
        run_for(&mut shell, &clock, Duration::from_millis(100));
        report(&shell);
    }

    let dirty = shell.toggle_theme();
    log::info!("toggle theme: {dirty:?}");

    let dirty = shell.navigate("#contact");
    log::info!("navigate #contact: {dirty:?}");
    run_for(&mut shell, &clock, pan + FRAME);
    report(&shell);

    if let Some(form) = shell.contact() {
        form.set_field(Field::Name, "Visitor");
        form.set_field(Field::Email, "visitor@example.com");
        form.set_field(Field::Message, "Hello!");
        form.submit();
    }
    run_for(&mut shell, &clock, round_trip + FRAME);
    let status = shell.contact().map(|f| f.status());
    log::info!("contact form: {status:?}");
    if status != Some(SubmitStatus::Succeeded) {
        log::warn!("contact form did not complete");
    }

    let dirty = shell.navigate("#nowhere");
    if dirty == Dirty::empty() {
        log::info!("unknown anchor ignored");
    }

    shell.unmount();
    log::info!("unmounted; {} timers left", shell.timers().pending());
    Ok(())
}
