use crate::app::Song;

#[cfg(feature = "desktop-notify")]
pub fn now_playing(song: &Song) {
    use notify_rust::{Notification, Urgency};

    let body = if song.artist.is_empty() {
        song.title.clone()
    } else {
        format!("{} · {}", song.title, song.artist)
    };

    let _ = Notification::new()
        .summary("Now playing")
        .body(&body)
        .icon("audio-x-generic")
        .urgency(Urgency::Normal)
        .show();
}

#[cfg(not(feature = "desktop-notify"))]
pub fn now_playing(_song: &Song) {}
