//! Motion-activated security camera over raw frame streams

use clap::*;
use log::*;
use std::time::{Duration, Instant};
use vigil::prelude::v1::{Result, *};

mod feed;

fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("vigil-cam")
        .version(crate_version!())
        .author(crate_authors!())
        .arg(Arg::new("record").long("record").short('r').help(
            "Record any motion that is tracked",
        ))
        .arg(Arg::new("feed").long("feed").short('f').help(
            "Render the live feed to the terminal",
        ))
        .arg(
            Arg::new("bounding-boxes")
                .long("bounding-boxes")
                .short('b')
                .help("Overlay the region bounding boxes"),
        )
        .arg(
            Arg::new("occupation-stamp")
                .long("occupation-stamp")
                .short('o')
                .help("Print the occupation stamp with the feed"),
        )
        .arg(
            Arg::new("no-time-stamp")
                .long("no-time-stamp")
                .help("Suppress the time stamp line"),
        )
        .arg(
            Arg::new("unoccupied-ticks")
                .long("unoccupied-ticks")
                .short('u')
                .takes_value(true)
                .default_value("50")
                .help("Tick buffer between occupied and unoccupied statuses (25 <= x <= 2500)"),
        )
        .arg(
            Arg::new("footage-dir")
                .long("footage-dir")
                .takes_value(true)
                .default_value("security_footage")
                .help("Directory recordings are written into"),
        )
        .arg(Arg::new("input").takes_value(true).required(true))
        .get_matches();

    let config = CameraConfig {
        bounding_boxes: matches.is_present("bounding-boxes"),
        feed: matches.is_present("feed"),
        occupation_stamp: matches.is_present("occupation-stamp"),
        time_stamp: !matches.is_present("no-time-stamp"),
        record: matches.is_present("record"),
        unoccupied_ticks: matches.value_of("unoccupied-ticks").unwrap().parse()?,
        footage_dir: matches.value_of("footage-dir").unwrap().into(),
    };

    // Range problems are fatal here, before any frame is touched.
    config.validate()?;

    if config.record {
        vigil::recorder::prepare_footage_dir(&config.footage_dir)?;
    }

    let input = matches.value_of("input").unwrap();
    let mut source = frame_loader::create_source(input)?;
    let mut pipeline = SecurityPipeline::new(&config, source.framerate())?;

    let result = run(source.as_mut(), &mut pipeline, &config);

    // Flush any open session on every exit path, before the source goes.
    pipeline.shutdown()?;

    let frames = result?;
    info!("processed {} frames", frames);

    Ok(())
}

fn run(
    source: &mut dyn FrameSource,
    pipeline: &mut SecurityPipeline,
    config: &CameraConfig,
) -> Result<u64> {
    let feed = feed::Feed::new(config);
    let interval = source.framerate().map(|rate| 1f64 / rate);
    let start = Instant::now();

    let mut frame = Frame::default();
    let mut cnt = 0u64;

    while source.read_frame(&mut frame)? {
        // Pace the live feed to the stream's framerate.
        if let (true, Some(interval)) = (config.feed, interval) {
            let target_time = Duration::from_secs_f64(interval * cnt as f64);
            let curtime = start.elapsed();

            if curtime < target_time {
                std::thread::sleep(target_time - curtime);
            }
        }

        let report = pipeline.process_frame(&frame)?;

        match report.transition {
            Some(Transition::Entered) => info!("room occupied"),
            Some(Transition::Exited) => info!("room unoccupied"),
            None => {}
        }

        if config.feed {
            feed.render(&report, frame.dim());
        }

        cnt += 1;
    }

    Ok(cnt)
}
