use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;
use std::time::Duration;

use vitrine_core::{Clock, Instant, ManualClock, MemoryStorage, Size, Theme};

use crate::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn desktop() -> PageLayout {
    PageLayout::standard(Size::new(1280.0, 800.0))
}

fn shell_with(storage: MemoryStorage) -> (ManualClock, PageShell) {
    let clock = ManualClock::default();
    let shell = PageShell::new(
        PageConfig::default(),
        Rc::new(clock.clone()),
        storage,
        desktop(),
    )
    .unwrap();
    (clock, shell)
}

/// Shell past its splash; returns the mount instant.
fn mounted(storage: MemoryStorage) -> (ManualClock, PageShell, Instant) {
    let (clock, mut shell) = shell_with(storage);
    clock.advance(ms(2000));
    let dirty = shell.tick();
    assert!(dirty.contains(Dirty::MOUNT));
    let at = clock.now();
    (clock, shell, at)
}

#[test]
fn test_splash_then_single_mount() {
    let (clock, mut shell) = shell_with(MemoryStorage::default());
    assert!(shell.is_loading());
    assert_eq!(shell.phase(), GatePhase::Splash);
    assert!(shell.nav().is_none());

    clock.advance(ms(1999));
    assert!(!shell.tick().contains(Dirty::MOUNT));
    assert!(shell.is_loading());

    clock.advance(ms(1));
    assert!(shell.tick().contains(Dirty::MOUNT));
    assert_eq!(shell.sections().len(), 5);

    for _ in 0..5 {
        clock.advance(ms(1000));
        assert!(!shell.tick().contains(Dirty::MOUNT));
    }
    assert_eq!(shell.phase(), GatePhase::Ready);
}

#[test]
fn test_scenario_fresh_load_then_toggle() {
    let storage = MemoryStorage::default();
    let (_clock, mut shell, _) = mounted(storage.clone());

    assert_eq!(shell.theme(), Theme::Light);
    assert_eq!(shell.nav().map(NavBar::theme), Some(Theme::Light));
    assert_eq!(shell.theme_toggle().map(ThemeToggle::icon), Some(ToggleIcon::Moon));
    assert_eq!(storage.get("theme"), None);

    let dirty = shell.toggle_theme();
    assert!(dirty.contains(Dirty::THEME));
    assert_eq!(shell.theme(), Theme::Dark);
    assert_eq!(storage.get("theme").as_deref(), Some("dark"));

    assert_eq!(shell.nav().map(NavBar::theme), Some(Theme::Dark));
    assert_eq!(shell.theme_toggle().map(ThemeToggle::icon), Some(ToggleIcon::Sun));
    assert_eq!(
        shell.theme_toggle().map(ThemeToggle::icon_color),
        Some(Palette::for_theme(Theme::Dark).toggle_icon)
    );
    assert_eq!(
        shell.backdrop().map(Backdrop::brush),
        Some(Palette::for_theme(Theme::Dark).background)
    );
}

#[test]
fn test_persisted_dark_theme_survives_reload() {
    let storage = MemoryStorage::with_entry("theme", "dark");
    let (_clock, shell, _) = mounted(storage);
    assert_eq!(shell.theme(), Theme::Dark);
    assert_eq!(shell.theme_toggle().map(ThemeToggle::icon), Some(ToggleIcon::Sun));
}

#[test]
fn test_custom_theme_key() {
    let storage = MemoryStorage::with_entry("portfolio-theme", "dark");
    let config = PageConfig::from_json_str(r#"{ "theme_key": "portfolio-theme" }"#).unwrap();
    let clock = ManualClock::default();
    let mut shell = PageShell::new(config, Rc::new(clock.clone()), storage.clone(), desktop()).unwrap();
    assert_eq!(shell.theme(), Theme::Dark);
    shell.toggle_theme();
    assert_eq!(storage.get("portfolio-theme").as_deref(), Some("light"));
    assert_eq!(storage.get("theme"), None);
}

#[test]
fn test_scroll_drives_section_motion_and_nav() {
    let (clock, mut shell, _) = mounted(MemoryStorage::default());
    let about = shell.section(SectionId::About).map(Section::motion_params);
    assert_eq!(about.map(|p| (p.offset_y, p.opacity)), Some((50.0, 0.0)));
    assert_eq!(shell.nav().map(NavBar::is_scrolled), Some(false));

    clock.advance(ms(16));
    let dirty = shell.scroll_to(1046.0);
    assert!(dirty.contains(Dirty::SCROLL | Dirty::NAV | Dirty::MOTION));
    assert_eq!(shell.nav().map(NavBar::is_scrolled), Some(true));

    let Some(about) = shell.section(SectionId::About) else {
        panic!("about section missing");
    };
    assert_eq!(about.progress(), 0.5);
    assert_eq!(about.motion_params().offset_y, 0.0);
    assert_eq!(about.motion_params().opacity, 1.0);

    // the hero has no scroll-linked motion
    let home = shell.section(SectionId::Home).map(Section::progress);
    assert_eq!(home, Some(0.0));
}

#[test]
fn test_throttled_scroll_is_flushed_later() {
    let (clock, mut shell, _) = mounted(MemoryStorage::default());

    // same instant as the mount-time recompute: deferred
    let dirty = shell.scroll_to(1046.0);
    assert!(dirty.contains(Dirty::SCROLL));
    assert!(!dirty.contains(Dirty::MOTION));
    assert_eq!(shell.section(SectionId::About).map(Section::progress), Some(0.0));

    clock.advance(ms(16));
    let dirty = shell.tick();
    assert!(dirty.contains(Dirty::MOTION));
    assert_eq!(shell.section(SectionId::About).map(Section::progress), Some(0.5));
}

#[test]
fn test_progress_is_monotonic_through_a_section() {
    let (clock, mut shell, _) = mounted(MemoryStorage::default());
    let mut last = 0.0;
    for step in 0..=40 {
        clock.advance(ms(20));
        shell.scroll_to(step as f32 * 60.0);
        let p = shell
            .section(SectionId::Projects)
            .map_or(-1.0, Section::progress);
        assert!((0.0..=1.0).contains(&p));
        assert!(p >= last, "progress went back at step {step}: {p} < {last}");
        last = p;
    }
}

#[test]
fn test_ornament_receives_rotation() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let clock = ManualClock::default();
    let mut shell = PageShell::new(
        PageConfig::default(),
        Rc::new(clock.clone()),
        MemoryStorage::default(),
        desktop(),
    )
    .unwrap()
    .with_ornament(SectionId::Skills, {
        let seen = seen.clone();
        move |p: &MotionParams| seen.borrow_mut().push(p.rotation_deg)
    });

    clock.advance(ms(2000));
    shell.tick();
    clock.advance(ms(16));
    shell.scroll_to(3398.0);
    assert_eq!(*seen.borrow(), vec![0.0, 180.0]);
}

#[test]
fn test_hero_children_follow_container() {
    let (clock, mut shell, at) = mounted(MemoryStorage::default());
    let Some(hero) = shell.section(SectionId::Home) else {
        panic!("hero missing");
    };
    let container = hero.reveals().container().cloned();
    assert_eq!(container.and_then(|c| c.started_at()), Some(at));
    assert!(hero.reveals().items().iter().all(|c| !c.is_visible()));

    // one late frame fires every child at its own scheduled instant
    clock.advance(ms(5000));
    assert!(shell.tick().contains(Dirty::REVEAL));
    let Some(hero) = shell.section(SectionId::Home) else {
        panic!("hero missing");
    };
    let starts: Vec<_> = hero
        .reveals()
        .items()
        .iter()
        .map(|c| c.started_at())
        .collect();
    let expected: Vec<_> = (0..4u64).map(|i| Some(at + ms(900 + 200 * i))).collect();
    assert_eq!(starts, expected);
}

#[test]
fn test_about_items_reveal_once_with_threshold() {
    let (clock, mut shell, _) = mounted(MemoryStorage::default());
    clock.advance(ms(16));
    shell.scroll_to(1084.0);
    let t = clock.now();

    let Some(about) = shell.section(SectionId::About) else {
        panic!("about missing");
    };
    let visible: Vec<bool> = about.reveals().items().iter().map(|c| c.is_visible()).collect();
    assert_eq!(visible, vec![true, true, true, true, false]);
    assert_eq!(about.reveals().items()[2].started_at(), Some(t));
    assert_eq!(about.reveals().items()[2].easing_starts_at(), Some(t + ms(400)));
    assert_eq!(about.reveals().watching(), 2);

    clock.advance(ms(100));
    shell.scroll_to(0.0);
    clock.advance(ms(100));
    shell.scroll_to(1084.0);
    let Some(about) = shell.section(SectionId::About) else {
        panic!("about missing");
    };
    assert_eq!(about.reveals().items()[0].started_at(), Some(t));
}

#[test]
fn test_navigate_pans_and_reveals_contact_form() {
    let (clock, mut shell, _) = mounted(MemoryStorage::default());
    shell.toggle_menu();
    assert_eq!(shell.nav().map(NavBar::is_menu_open), Some(true));

    let dirty = shell.navigate("#contact");
    assert!(dirty.contains(Dirty::NAV));
    assert_eq!(shell.nav().map(NavBar::is_menu_open), Some(false));
    assert!(shell.viewport().is_panning());

    clock.advance(ms(300));
    shell.tick();
    let mid = shell.viewport().scroll_y();
    assert!(mid > 0.0 && mid < 4268.0);

    clock.advance(ms(300));
    shell.tick();
    assert_eq!(shell.viewport().scroll_y(), 4268.0);
    assert!(!shell.viewport().is_panning());
    let landed = clock.now();

    let container = shell
        .section(SectionId::Contact)
        .and_then(|s| s.reveals().container().cloned());
    assert_eq!(container.and_then(|c| c.started_at()), Some(landed));

    clock.advance(ms(2000));
    shell.tick();
    let Some(contact) = shell.section(SectionId::Contact) else {
        panic!("contact missing");
    };
    let starts: Vec<_> = contact
        .reveals()
        .items()
        .iter()
        .map(|c| c.started_at())
        .collect();
    let expected: Vec<_> = (0..5u64).map(|i| Some(landed + ms(600 + 100 * i))).collect();
    assert_eq!(starts, expected);
}

#[test]
fn test_unknown_anchor_is_a_no_op() {
    let (_clock, mut shell, _) = mounted(MemoryStorage::default());
    assert_eq!(shell.navigate("#blog"), Dirty::empty());
    assert!(!shell.viewport().is_panning());
    assert_eq!(shell.viewport().scroll_y(), 0.0);
}

#[test]
fn test_nan_scroll_is_ignored() {
    let (clock, mut shell, _) = mounted(MemoryStorage::default());
    clock.advance(ms(16));
    shell.scroll_to(1046.0);
    assert_eq!(shell.scroll_to(f32::NAN), Dirty::empty());
    assert_eq!(shell.viewport().scroll_y(), 1046.0);
    let Some(about) = shell.section(SectionId::About) else {
        panic!("about missing");
    };
    assert!((about.progress() - 0.5).abs() < 1e-3);
}

#[test]
fn test_mobile_menu_toggle_and_close() {
    let (_clock, mut shell, _) = mounted(MemoryStorage::default());
    assert_eq!(shell.toggle_menu(), Dirty::NAV);
    assert_eq!(shell.nav().map(NavBar::is_menu_open), Some(true));
    assert_eq!(shell.close_menu(), Dirty::NAV);
    assert_eq!(shell.nav().map(NavBar::is_menu_open), Some(false));
    // already closed
    assert_eq!(shell.close_menu(), Dirty::empty());
}

#[test]
fn test_user_scroll_interrupts_navigation() {
    let (clock, mut shell, _) = mounted(MemoryStorage::default());
    shell.navigate("projects");
    clock.advance(ms(100));
    shell.tick();
    shell.scroll_to(50.0);
    clock.advance(ms(1000));
    shell.tick();
    assert_eq!(shell.viewport().scroll_y(), 50.0);
}

#[test]
fn test_resize_relayouts_sections() {
    let (clock, mut shell, _) = mounted(MemoryStorage::default());
    clock.advance(ms(16));
    shell.scroll_to(1046.0);

    let narrow = PageLayout::standard(Size::new(375.0, 700.0));
    let about_bounds = narrow.section(SectionId::About).map(|s| s.bounds);
    let dirty = shell.resize(narrow);
    assert!(dirty.contains(Dirty::LAYOUT));
    assert_eq!(shell.viewport().size(), Size::new(375.0, 700.0));
    assert_eq!(shell.section(SectionId::About).map(Section::bounds), about_bounds);
    let p = shell.section(SectionId::About).map_or(-1.0, Section::progress);
    assert!((0.0..=1.0).contains(&p));
}

#[test]
fn test_contact_form_through_shell() {
    let (clock, mut shell, _) = mounted(MemoryStorage::default());
    let Some(form) = shell.contact() else {
        panic!("contact form missing");
    };
    form.set_field(Field::Email, "ada@example.com");
    assert!(form.submit());
    assert!(shell.tick().contains(Dirty::FORM));

    clock.advance(ms(1500));
    shell.tick();
    assert_eq!(shell.contact().map(ContactForm::status), Some(SubmitStatus::Succeeded));
    clock.advance(ms(5000));
    assert!(shell.tick().contains(Dirty::FORM));
    assert_eq!(shell.contact().map(ContactForm::status), Some(SubmitStatus::Idle));
}

#[test]
fn test_unmount_cancels_everything() {
    let (clock, mut shell, _) = mounted(MemoryStorage::default());
    if let Some(form) = shell.contact() {
        form.submit();
    }
    shell.scroll_to(500.0);
    assert!(shell.timers().pending() > 0);

    shell.unmount();
    assert!(!shell.is_alive());
    assert_eq!(shell.timers().pending(), 0);
    assert_eq!(shell.theme_store().subscriber_count(), 0);

    clock.advance(ms(10_000));
    assert_eq!(shell.tick(), Dirty::empty());
    assert_eq!(shell.toggle_theme(), Dirty::empty());
    assert_eq!(shell.theme(), Theme::Light);
}

#[test]
fn test_unmount_during_splash_never_mounts() {
    let (clock, mut shell) = shell_with(MemoryStorage::default());
    shell.unmount();
    clock.advance(ms(3000));
    assert_eq!(shell.tick(), Dirty::empty());
    assert!(shell.is_loading());
    assert_eq!(shell.phase(), GatePhase::Splash);
}

#[test]
fn test_session_trace() {
    let storage = MemoryStorage::default();
    let (clock, mut shell) = shell_with(storage.clone());
    let mut trace = String::new();

    writeln!(trace, "splash: loading={} theme={}", shell.is_loading(), shell.theme()).unwrap();

    clock.advance(ms(2000));
    shell.tick();
    writeln!(
        trace,
        "mounted: loading={} icon={:?} nav_scrolled={:?}",
        shell.is_loading(),
        shell.theme_toggle().map(ThemeToggle::icon),
        shell.nav().map(NavBar::is_scrolled),
    )
    .unwrap();

    clock.advance(ms(16));
    shell.scroll_to(1046.0);
    writeln!(
        trace,
        "scrolled: y={} nav_scrolled={:?} about={:.2}",
        shell.viewport().scroll_y(),
        shell.nav().map(NavBar::is_scrolled),
        shell.section(SectionId::About).map_or(-1.0, Section::progress),
    )
    .unwrap();

    shell.toggle_theme();
    writeln!(
        trace,
        "toggled: theme={} icon={:?} stored={:?}",
        shell.theme(),
        shell.theme_toggle().map(ThemeToggle::icon),
        storage.get("theme"),
    )
    .unwrap();

    shell.navigate("contact");
    clock.advance(ms(600));
    shell.tick();
    writeln!(trace, "navigated: y={}", shell.viewport().scroll_y()).unwrap();

    shell.unmount();
    writeln!(trace, "unmounted: alive={}", shell.is_alive()).unwrap();

    insta::assert_snapshot!(trace.trim_end(), @r#"
    splash: loading=true theme=light
    mounted: loading=false icon=Some(Moon) nav_scrolled=Some(false)
    scrolled: y=1046 nav_scrolled=Some(true) about=0.50
    toggled: theme=dark icon=Some(Sun) stored=Some("dark")
    navigated: y=4268
    unmounted: alive=false
    "#);
}
