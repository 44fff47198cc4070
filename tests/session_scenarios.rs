//! End-to-end sessions driven through the scoring engine with a scripted detector.

use std::time::{Duration, Instant};

use golden_face::{
    reference_landmarks, Detection, Error, FaceBox, FaceDetector, FrameStatus,
    JsonlAssessmentLog, LandmarkSet, MemorySink, Point, ScoringEngine, Session, SessionConfig,
    SessionState, VarianceSource, LANDMARK_COUNT,
};

/// Frame `i` of the "video" is whatever the script says for index `i`.
struct ScriptedDetector {
    frames: Vec<Vec<Detection>>,
}

impl FaceDetector for ScriptedDetector {
    type Image = usize;

    fn detect(&self, frame: &usize) -> Vec<Detection> {
        self.frames.get(*frame).cloned().unwrap_or_default()
    }
}

fn face(x: i32) -> Detection {
    let face_box = FaceBox::new(x, 40, 320, 320);
    Detection {
        face_box,
        landmarks: reference_landmarks(&face_box),
    }
}

fn collapsed_face() -> Detection {
    Detection {
        face_box: FaceBox::new(0, 0, 100, 100),
        landmarks: LandmarkSet::new(vec![Point::new(42.0, 42.0); LANDMARK_COUNT]),
    }
}

fn at(t0: Instant, secs: u64) -> Instant {
    t0 + Duration::from_secs(secs)
}

#[test]
fn face_stream_finalizes_once() {
    let detector = ScriptedDetector {
        frames: vec![vec![face(10)], vec![], vec![face(12)], vec![face(14), face(400)]],
    };
    let engine = ScoringEngine::new(&detector);
    let expected = engine.score_image(&0).unwrap().normalized;

    let mut session = Session::new(SessionConfig::default(), VarianceSource::fixed(0.0)).unwrap();
    let mut sink = MemorySink::default();
    let t0 = Instant::now();
    session.start(t0);

    let r0 = engine.process_frame(&mut session, &0, at(t0, 1), &mut sink).unwrap();
    assert_eq!(r0.frame, Some(FrameStatus::Scored));

    let r1 = engine.process_frame(&mut session, &1, at(t0, 2), &mut sink).unwrap();
    assert_eq!(r1.frame, Some(FrameStatus::NoDetection));
    assert_eq!(r1.state, SessionState::Assessing);
    assert_eq!(session.scores().len(), 1);

    engine.process_frame(&mut session, &2, at(t0, 3), &mut sink).unwrap();
    let done = engine.process_frame(&mut session, &3, at(t0, 60), &mut sink).unwrap();
    assert_eq!(done.state, SessionState::Finalized);

    for secs in 61..65 {
        engine.process_frame(&mut session, &0, at(t0, secs), &mut sink).unwrap();
    }

    assert_eq!(sink.records.len(), 1);
    let final_score = sink.records[0].score;
    assert!((50.0..=99.0).contains(&final_score));
    // Translating the face does not change its proportions much.
    assert!((final_score - expected.min(99.0)).abs() < 1.0);
}

#[test]
fn degenerate_geometry_is_skipped() {
    let detector = ScriptedDetector {
        frames: vec![vec![collapsed_face()], vec![face(0)]],
    };
    let engine = ScoringEngine::new(&detector);
    assert!(matches!(
        engine.score_image(&0),
        Err(Error::DegenerateGeometry { .. })
    ));

    let mut session = Session::new(SessionConfig::default(), VarianceSource::fixed(0.0)).unwrap();
    let mut sink = MemorySink::default();
    let t0 = Instant::now();
    session.start(t0);

    let report = engine.process_frame(&mut session, &0, at(t0, 1), &mut sink).unwrap();
    assert_eq!(report.frame, Some(FrameStatus::DegenerateGeometry));
    assert!(session.scores().is_empty());
    assert_eq!(report.display_score, None);
}

#[test]
fn garbage_coordinates_are_skipped() {
    let mut far_apart = face(0);
    for p in &mut far_apart.landmarks.points[36..42] {
        p.x = -3e9;
    }
    for p in &mut far_apart.landmarks.points[42..48] {
        p.x = 3e9;
    }
    let mut nan_mouth = face(0);
    for p in &mut nan_mouth.landmarks.points[48..68] {
        *p = Point::new(f32::NAN, f32::NAN);
    }
    let detector = ScriptedDetector {
        frames: vec![vec![far_apart], vec![nan_mouth], vec![face(0)]],
    };
    let engine = ScoringEngine::new(&detector);

    let mut session = Session::new(SessionConfig::default(), VarianceSource::fixed(0.0)).unwrap();
    let mut sink = MemorySink::default();
    let t0 = Instant::now();
    session.start(t0);

    for frame in 0..2 {
        let report = engine.process_frame(&mut session, &frame, at(t0, 1), &mut sink).unwrap();
        assert_eq!(report.frame, Some(FrameStatus::DegenerateGeometry));
        assert_eq!(report.state, SessionState::Assessing);
    }
    assert!(session.scores().is_empty());

    let report = engine.process_frame(&mut session, &2, at(t0, 2), &mut sink).unwrap();
    assert_eq!(report.frame, Some(FrameStatus::Scored));
    assert_eq!(session.scores().len(), 1);
}

#[test]
fn malformed_landmarks_surface_as_errors() {
    let bad = Detection {
        face_box: FaceBox::new(0, 0, 100, 100),
        landmarks: LandmarkSet::new(vec![Point::new(1.0, 1.0); 5]),
    };
    let detector = ScriptedDetector {
        frames: vec![vec![bad]],
    };
    let engine = ScoringEngine::new(&detector);

    let mut session = Session::new(SessionConfig::default(), VarianceSource::fixed(0.0)).unwrap();
    let mut sink = MemorySink::default();
    let t0 = Instant::now();
    session.start(t0);

    let result = engine.process_frame(&mut session, &0, at(t0, 1), &mut sink);
    assert!(matches!(result, Err(Error::InvalidLandmarks { found: 5, .. })));
    assert_eq!(session.state(), SessionState::Assessing);
    assert!(session.scores().is_empty());
}

#[test]
fn no_face_for_whole_session() {
    let detector = ScriptedDetector { frames: vec![] };
    let engine = ScoringEngine::new(&detector);

    let mut session = Session::new(SessionConfig::default(), VarianceSource::fixed(1.5)).unwrap();
    let mut sink = MemorySink::default();
    let t0 = Instant::now();
    session.start(t0);

    for secs in (0..=90).step_by(5) {
        let report = engine.process_frame(&mut session, &0, at(t0, secs), &mut sink).unwrap();
        assert_eq!(report.state, SessionState::Assessing);
        assert_eq!(report.frame, Some(FrameStatus::NoDetection));
    }

    let report = session.conclude(at(t0, 90), &mut sink);
    assert_eq!(report.state, SessionState::NoAssessment);
    assert!(sink.records.is_empty());
}

#[test]
fn face_only_after_timeout_uses_that_frame() {
    let detector = ScriptedDetector {
        frames: vec![vec![], vec![face(0)]],
    };
    let engine = ScoringEngine::new(&detector);
    let frame_score = engine.score_image(&1).unwrap().normalized;

    let config = SessionConfig {
        duration_secs: 10,
        ..Default::default()
    };
    let mut session = Session::new(config, VarianceSource::fixed(-1.0)).unwrap();
    let mut sink = MemorySink::default();
    let t0 = Instant::now();
    session.start(t0);

    engine.process_frame(&mut session, &0, at(t0, 5), &mut sink).unwrap();
    let report = engine.process_frame(&mut session, &1, at(t0, 12), &mut sink).unwrap();

    assert_eq!(report.state, SessionState::Finalized);
    let expected = (frame_score - 1.0).clamp(50.0, 99.0);
    assert!((report.final_score.unwrap() - expected).abs() < 1e-9);
    assert_eq!(sink.records.len(), 1);
    assert_eq!(sink.records[0].duration_seconds, 10);
}

#[test]
fn independent_sessions_share_one_detector() {
    let detector = ScriptedDetector {
        frames: vec![vec![face(0)]],
    };
    let engine = ScoringEngine::new(&detector);
    let t0 = Instant::now();

    let mut a = Session::new(SessionConfig::default(), VarianceSource::fixed(3.0)).unwrap();
    let mut b = Session::new(SessionConfig::default(), VarianceSource::fixed(-3.0)).unwrap();
    let mut sink_a = MemorySink::default();
    let mut sink_b = MemorySink::default();
    a.start(t0);
    b.start(t0);

    for secs in [1, 2, 60] {
        engine.process_frame(&mut a, &0, at(t0, secs), &mut sink_a).unwrap();
        engine.process_frame(&mut b, &0, at(t0, secs), &mut sink_b).unwrap();
    }

    assert_eq!(sink_a.records.len(), 1);
    assert_eq!(sink_b.records.len(), 1);
    assert!(sink_a.records[0].score >= sink_b.records[0].score);
}

#[test]
fn results_land_in_the_log() {
    let dir = tempfile::tempdir().unwrap();
    let mut log = JsonlAssessmentLog::new(dir.path().join("assessments.jsonl"));

    let detector = ScriptedDetector {
        frames: vec![vec![face(0)]],
    };
    let engine = ScoringEngine::new(&detector);
    let mut session = Session::new(SessionConfig::default(), VarianceSource::seeded(11)).unwrap();
    let t0 = Instant::now();

    for run in 0..2u64 {
        let start = at(t0, run * 100);
        session.start(start);
        engine.process_frame(&mut session, &0, at(start, 1), &mut log).unwrap();
        engine.process_frame(&mut session, &0, at(start, 60), &mut log).unwrap();
        engine.process_frame(&mut session, &0, at(start, 61), &mut log).unwrap();
    }

    let records = log.read_all().unwrap();
    assert_eq!(records.len(), 2);
    for record in records {
        assert!((50.0..=99.0).contains(&record.score));
        assert_eq!(record.duration_seconds, 60);
    }
}
