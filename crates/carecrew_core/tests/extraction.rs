use carecrew_core::extract::prompt::EVENT_SEPARATOR;
use carecrew_core::{
    ExtractionError, Extractor, GenerationRequest, TaskType, TextGenerator, ValidationError,
};
use std::cell::RefCell;
use std::collections::VecDeque;

const ONE_SHIFT: &str = r#"[{"flightNumber":"LY315","origin":"TLV","destination":"LHR",
  "departureTime":"14:00","arrivalTime":"18:00","dateLabel":"25/10","careStart":"13:00",
  "careEnd":"19:00","suggestedTasks":[{"type":"pickup","description":"pickup","time":"13:30",
  "dateLabel":"25/10"}]}]"#;

#[test]
fn non_json_reply_degrades_to_empty_list() {
    let extractor = Extractor::new(ScriptedGenerator::replying(&[Some("not json")]));

    let results = extractor.extract(&["LY315 to London at 14:00"]);

    assert!(results.is_empty());
}

#[test]
fn non_json_reply_is_a_typed_parse_failure() {
    let extractor = Extractor::new(ScriptedGenerator::replying(&[Some("not json")]));

    let err = extractor.try_extract(&["event"]).unwrap_err();
    assert!(matches!(err, ExtractionError::Parse(_)));
    assert!(err.is_parse_failure());
}

#[test]
fn missing_text_is_a_parse_failure_and_degrades_to_empty() {
    let extractor = Extractor::new(ScriptedGenerator::replying(&[None, None]));

    assert!(matches!(
        extractor.try_extract(&["event"]),
        Err(ExtractionError::EmptyResponse)
    ));
    assert!(extractor.extract(&["event"]).is_empty());
}

#[test]
fn transport_failure_degrades_to_empty_list() {
    let generator = ScriptedGenerator::default();
    generator.push(Err("connection reset"));
    generator.push(Err("HTTP 403"));
    let extractor = Extractor::new(generator);

    assert!(extractor.extract(&["event"]).is_empty());
    let err = extractor.try_extract(&["event"]).unwrap_err();
    assert!(err.is_transport_failure());
}

#[test]
fn schema_invalid_record_rejects_whole_batch() {
    let second_bad = ONE_SHIFT
        .trim_end_matches(']')
        .to_string()
        + r#",{"flightNumber":"AF123","origin":"CDG","destination":"TLV","departureTime":"soon",
  "arrivalTime":"22:00","dateLabel":"28/10","careStart":"16:00","careEnd":"23:00",
  "suggestedTasks":[]}]"#;
    let extractor = Extractor::new(ScriptedGenerator::replying(&[Some(second_bad.as_str())]));

    match extractor.try_extract(&["event"]) {
        Err(ExtractionError::Invalid { index, error }) => {
            assert_eq!(index, 1);
            assert!(matches!(error, ValidationError::InvalidTime { field, .. } if field == "departureTime"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[test]
fn valid_reply_is_returned_as_parsed() {
    let extractor = Extractor::new(ScriptedGenerator::replying(&[Some(ONE_SHIFT)]));

    let results = extractor.extract(&["LY315"]);

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].flight_number, "LY315");
    assert_eq!(results[0].suggested_tasks[0].task_type, TaskType::Pickup);
}

#[test]
fn each_call_sends_exactly_one_request_with_all_events() {
    let extractor = Extractor::new(ScriptedGenerator::replying(&[Some("[]"), Some("[]")]));
    let events = ["LY315 Tel Aviv to London 14:00", "Dentist 10:00"];

    extractor.extract(&events);
    extractor.extract(&events[..1]);

    let requests = extractor.generator().requests.borrow();
    assert_eq!(requests.len(), 2);
    assert!(requests[0]
        .prompt
        .contains(&format!("{}{EVENT_SEPARATOR}{}", events[0], events[1])));
    assert_eq!(requests[0].response_schema["type"], "ARRAY");
    assert!(!requests[1].prompt.contains("Dentist"));
}

#[derive(Default)]
struct ScriptedGenerator {
    replies: RefCell<VecDeque<Result<Option<String>, String>>>,
    requests: RefCell<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    fn replying(texts: &[Option<&str>]) -> Self {
        let generator = Self::default();
        for text in texts {
            generator
                .replies
                .borrow_mut()
                .push_back(Ok(text.map(str::to_string)));
        }
        generator
    }

    fn push(&self, reply: Result<&str, &str>) {
        self.replies.borrow_mut().push_back(
            reply
                .map(|text| Some(text.to_string()))
                .map_err(str::to_string),
        );
    }
}

impl TextGenerator for ScriptedGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<Option<String>, ExtractionError> {
        self.requests.borrow_mut().push(request.clone());
        match self.replies.borrow_mut().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(ExtractionError::Transport(message)),
            None => Err(ExtractionError::Transport("script exhausted".to_string())),
        }
    }
}
