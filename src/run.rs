use crate::api;
use crate::configuration::Settings;
use crate::gateway::{ContentGateway, GatewayClient, Provider};
use crate::mapping::{DatabaseLocation, MappingClient, MappingService};
use crate::models::{Cli, Command};
use crate::router::{Controller, FilterForm, Outcome, View};
use crate::storage::{FileStore, LocalState};
use log::{debug, info};
use std::fs;

type Reader = Controller<MappingClient, GatewayClient, FileStore>;

pub async fn run(cli: Cli, settings: Settings) -> anyhow::Result<()> {
    debug!("Settings {:?}", settings);

    match cli.command {
        Command::Serve => serve(&settings).await,
        Command::Open { path, page } => {
            let reader = reader(&settings)?;
            let mut outcome = reader.initial_load(&path).await;
            if page > 1 {
                outcome = reader.goto_page(page).await;
            }
            debug!("Opened {} -> {:?} at {}", path, outcome, reader.location().current());
            show(&reader)
        }
        Command::Search {
            query,
            genre,
            kind,
            status,
            page,
        } => {
            let reader = reader(&settings)?;
            let form = FilterForm {
                query: query.unwrap_or_default(),
                genre: genre.unwrap_or_default(),
                kind: kind.unwrap_or_default(),
                status: status.unwrap_or_default(),
            };
            reader.apply_filter(&form).await;
            if page > 1 {
                reader.goto_page(page).await;
            }
            show(&reader)
        }
        Command::Genres => {
            let reader = reader(&settings)?;
            for genre in reader.genres().await {
                println!("{} ({})", genre.title, genre.slug);
            }
            Ok(())
        }
        Command::Genre { slug, page } => {
            let reader = reader(&settings)?;
            reader.show_genre(&slug, page).await;
            show(&reader)
        }
        Command::Chapters { series, filter } => {
            let reader = reader(&settings)?;
            reader.show_detail(&series, false).await;
            let view = reader.view();
            let View::Detail(detail) = &*view else {
                anyhow::bail!("Comic {} not found", series);
            };
            for chapter in detail.comic.filter_chapters(filter.as_deref().unwrap_or_default()) {
                let marker = if detail.last_read.as_deref() == Some(chapter.slug.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{} {} ({})", marker, chapter.title, chapter.slug);
            }
            Ok(())
        }
        Command::Read {
            series,
            chapter,
            next,
            prev,
        } => {
            let reader = reader(&settings)?;
            if reader.show_detail(&series, true).await != Outcome::Rendered {
                anyhow::bail!("Comic {} not found", series);
            }
            match chapter {
                Some(chapter) => {
                    let comic = match &*reader.view() {
                        View::Detail(detail) => detail.comic.slug.clone(),
                        _ => series.clone(),
                    };
                    reader.read_chapter(&chapter, Some(&comic), true).await;
                }
                None => {
                    reader.start_reading().await;
                    if next {
                        reader.next_chapter().await;
                    } else if prev {
                        reader.prev_chapter().await;
                    }
                }
            }
            show(&reader)
        }
        Command::History => {
            let reader = reader(&settings)?;
            reader.show_history(false);
            show(&reader)
        }
        Command::Bookmarks => {
            let reader = reader(&settings)?;
            reader.show_bookmarks(false);
            show(&reader)
        }
        Command::Bookmark { slug } => {
            let reader = reader(&settings)?;
            let comic = reader.gateway().detail(&slug).await?;
            reader.toggle_bookmark(&slug, &comic.title, &comic.image);
            Ok(())
        }
    }
}

fn show(reader: &Reader) -> anyhow::Result<()> {
    print!("{}", *reader.view());
    Ok(())
}

async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let location = settings.database_location();
    if let DatabaseLocation::File(path) = &location {
        info!("Database: {}", path.display());
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
    }
    api::serve(MappingService::new(location), &settings.bind_address).await
}

fn reader(settings: &Settings) -> anyhow::Result<Reader> {
    let provider = Provider::new(
        settings.provider.kind,
        settings.provider.base_url.as_deref(),
        settings.provider.proxy_url.as_deref(),
    )?
    .with_chapter_order(settings.provider.chapter_order);
    info!("Provider: {:?}", provider.kind);

    Ok(Controller::new(
        MappingClient::new(&settings.backend_url),
        GatewayClient::new(provider),
        LocalState::new(FileStore::new(settings.state_path())),
    ))
}
