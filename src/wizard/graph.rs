//! Step tables for every dialog.
//!
//! Each flow is a static [`FlowGraph`]: a list of [`StepRule`]s saying how a step validates
//! its input, where it goes next and how it asks its question. The engine owns all
//! control flow; this module only holds plain functions and tables.
//!
//! Object resolution is shared by the add flows through two symbolic transitions:
//! [`Transition::ChooseObject`] (skip when an object is preset, list the active objects
//! when there are any, ask for a name otherwise) and [`Transition::AfterObject`] (the
//! flow's own continuation once an object is known).

use super::{
    StepEnv,
    action::{Action, DateChoice, Input, PeriodChoice},
    conversation::{Answers, Flow, Step},
    reply::{Reply, date_keyboard},
};
use crate::{
    core::{
        dates::{hours_between, parse_date, parse_time, resolve_date_text},
        format::format_date,
        payment::KOPECKS_PER_RUBLE,
        report::last_month_period,
    },
    entities::work_object,
};

/// Where a dialog goes after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Ask the given step next
    Goto(Step),
    /// Resolve the target object (preset, pick from list or type a name)
    ChooseObject,
    /// Continue the flow once the object is known
    AfterObject,
    /// All answers are in; persist or compute the result
    Commit,
}

/// Result of validating one input against one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Valid; follow the rule's default transition
    Accept,
    /// Valid; follow this transition instead
    Jump(Transition),
    /// Invalid; show the message and ask again
    Retry(String),
    /// The input does not belong to this step; ask again without an error
    Reprompt,
}

/// What a prompt renderer can see.
#[derive(Debug, Clone, Copy)]
pub struct PromptView<'a> {
    /// Answers collected so far
    pub answers: &'a Answers,
    /// Active objects, loaded only for [`Step::ObjectChoice`]
    pub objects: &'a [work_object::Model],
    /// Date and settings of the turn
    pub env: &'a StepEnv<'a>,
}

/// Validator signature: writes accepted values into the answers.
pub type AcceptFn = fn(&mut Answers, &Input, &StepEnv<'_>) -> Verdict;
/// Prompt renderer signature.
pub type PromptFn = fn(&PromptView<'_>) -> Reply;

/// One row of a flow table.
pub struct StepRule {
    /// The step this row handles
    pub step: Step,
    /// Validates the input
    pub accept: AcceptFn,
    /// Default transition after [`Verdict::Accept`]
    pub then: Transition,
    /// Renders the question for this step
    pub prompt: PromptFn,
}

/// A complete dialog definition.
pub struct FlowGraph {
    /// The flow described
    pub flow: Flow,
    /// Step asked when the flow starts
    pub first: Step,
    /// Continuation once the object is known
    pub after_object: Transition,
    /// Acknowledgement shown on cancellation
    pub cancelled: &'static str,
    /// Header shown above the first prompt
    pub title: &'static str,
    /// All steps of the flow
    pub rules: &'static [StepRule],
}

impl FlowGraph {
    /// Looks up the row for `step`.
    #[must_use]
    pub fn rule(&self, step: Step) -> Option<&StepRule> {
        self.rules.iter().find(|rule| rule.step == step)
    }
}

const INVALID_DATE: &str = "❌ Неверный формат даты. Используйте формат ДД.ММ.ГГ\n\
    Например: 15.08.24 или напишите 'сегодня'";
const INVALID_PLAIN_DATE: &str = "❌ Неверный формат даты. Используйте формат ДД.ММ.ГГ";
const INVALID_TIME: &str = "❌ Неверный формат времени. Используйте формат ЧЧ:ММ\nНапример: 09:30";
const INVALID_AMOUNT: &str = "❌ Пожалуйста, введите целое положительное число для суммы оплаты.";
const INVALID_HOURS: &str = "❌ Пожалуйста, введите целое положительное число для часов работы.";
const EXTRA_EDIT_SKIP_WORDS: [&str; 2] = ["удалить", "delete"];

fn text(input: &Input) -> Option<&str> {
    match input {
        Input::Text(text) => Some(text.trim()),
        Input::Action(_) => None,
    }
}

// Validators

/// Date step of the add flows: quick choices or a typed date.
fn accept_date(answers: &mut Answers, input: &Input, env: &StepEnv<'_>) -> Verdict {
    let date = match input {
        Input::Action(Action::PickDate(DateChoice::Today)) => Some(env.today),
        Input::Action(Action::PickDate(DateChoice::Yesterday)) => env.today.pred_opt(),
        Input::Action(Action::PickDate(DateChoice::Manual)) => {
            return Verdict::Jump(Transition::Goto(Step::ManualDate));
        }
        Input::Action(_) => return Verdict::Reprompt,
        Input::Text(text) => resolve_date_text(text, env.today),
    };

    match date {
        Some(date) => {
            answers.date = Some(date);
            Verdict::Accept
        }
        None => Verdict::Retry(INVALID_DATE.to_string()),
    }
}

/// Typed date with today/yesterday keywords.
fn accept_manual_date(answers: &mut Answers, input: &Input, env: &StepEnv<'_>) -> Verdict {
    let Some(text) = text(input) else {
        return Verdict::Reprompt;
    };
    match resolve_date_text(text, env.today) {
        Some(date) => {
            answers.date = Some(date);
            Verdict::Accept
        }
        None => Verdict::Retry(INVALID_DATE.to_string()),
    }
}

/// Strict `DD.MM.YY` date used by the edit flows.
fn accept_plain_date(answers: &mut Answers, input: &Input, _env: &StepEnv<'_>) -> Verdict {
    let Some(text) = text(input) else {
        return Verdict::Reprompt;
    };
    match parse_date(text) {
        Some(date) => {
            answers.date = Some(date);
            Verdict::Accept
        }
        None => Verdict::Retry(INVALID_PLAIN_DATE.to_string()),
    }
}

fn accept_start_time(answers: &mut Answers, input: &Input, env: &StepEnv<'_>) -> Verdict {
    let Some(text) = text(input) else {
        return Verdict::Reprompt;
    };
    match parse_time(text, answers.date.unwrap_or(env.today)) {
        Some(start) => {
            answers.start = Some(start);
            Verdict::Accept
        }
        None => Verdict::Retry(INVALID_TIME.to_string()),
    }
}

fn accept_end_time(answers: &mut Answers, input: &Input, env: &StepEnv<'_>) -> Verdict {
    let Some(text) = text(input) else {
        return Verdict::Reprompt;
    };
    let Some(end) = parse_time(text, answers.date.unwrap_or(env.today)) else {
        return Verdict::Retry(INVALID_TIME.to_string());
    };
    let Some(start) = answers.start else {
        return Verdict::Jump(Transition::Goto(Step::StartTime));
    };

    let hours = hours_between(start, end);
    if hours <= 0.0 {
        return Verdict::Retry("❌ Время окончания должно быть позже времени начала.".to_string());
    }
    answers.end = Some(end);
    answers.hours = Some(hours);
    Verdict::Accept
}

/// Pick a listed object, switch to typing, or type a name right away.
fn accept_object_choice(answers: &mut Answers, input: &Input, env: &StepEnv<'_>) -> Verdict {
    match input {
        Input::Action(Action::SelectObject(id)) => {
            answers.object_id = Some(*id);
            answers.object_name = None;
            Verdict::Accept
        }
        Input::Action(Action::ManualObject) => Verdict::Jump(Transition::Goto(Step::ObjectName)),
        Input::Action(_) => Verdict::Reprompt,
        Input::Text(_) => accept_object_name(answers, input, env),
    }
}

fn accept_object_name(answers: &mut Answers, input: &Input, _env: &StepEnv<'_>) -> Verdict {
    let Some(name) = text(input) else {
        return Verdict::Reprompt;
    };
    if name.is_empty() {
        return Verdict::Retry("❌ Название объекта не может быть пустым.".to_string());
    }
    answers.object_id = None;
    answers.object_name = Some(name.to_string());
    Verdict::Accept
}

fn accept_comment(answers: &mut Answers, input: &Input, env: &StepEnv<'_>) -> Verdict {
    let Some(comment) = text(input) else {
        return Verdict::Reprompt;
    };
    answers.comment = (!env.settings.is_skip_word(comment)).then(|| comment.to_string());
    Verdict::Accept
}

/// Like [`accept_comment`], but "удалить"/"delete" also clear the stored note.
fn accept_edit_comment(answers: &mut Answers, input: &Input, env: &StepEnv<'_>) -> Verdict {
    let Some(comment) = text(input) else {
        return Verdict::Reprompt;
    };
    let lowered = comment.to_lowercase();
    let skip =
        env.settings.is_skip_word(comment) || EXTRA_EDIT_SKIP_WORDS.contains(&lowered.as_str());
    answers.comment = (!skip).then(|| comment.to_string());
    Verdict::Accept
}

/// Whole rubles, stored as kopecks.
fn accept_amount(answers: &mut Answers, input: &Input, _env: &StepEnv<'_>) -> Verdict {
    let Some(text) = text(input) else {
        return Verdict::Reprompt;
    };
    let kopecks = text
        .parse::<i64>()
        .ok()
        .filter(|rubles| *rubles > 0)
        .and_then(|rubles| rubles.checked_mul(KOPECKS_PER_RUBLE));

    match kopecks {
        Some(kopecks) => {
            answers.amount_kopecks = Some(kopecks);
            Verdict::Accept
        }
        None => Verdict::Retry(INVALID_AMOUNT.to_string()),
    }
}

/// Whole positive hours for the edit flow.
fn accept_hours(answers: &mut Answers, input: &Input, _env: &StepEnv<'_>) -> Verdict {
    let Some(text) = text(input) else {
        return Verdict::Reprompt;
    };
    match text.parse::<u32>() {
        Ok(hours) if hours > 0 => {
            answers.hours = Some(f64::from(hours));
            Verdict::Accept
        }
        _ => Verdict::Retry(INVALID_HOURS.to_string()),
    }
}

fn accept_period(answers: &mut Answers, input: &Input, env: &StepEnv<'_>) -> Verdict {
    match input {
        Input::Action(Action::ReportPeriod(PeriodChoice::LastMonth)) => {
            let (start, end) = last_month_period(env.today);
            answers.range_start = Some(start);
            answers.range_end = Some(end);
            Verdict::Jump(Transition::Commit)
        }
        Input::Action(Action::ReportPeriod(PeriodChoice::Custom)) => Verdict::Accept,
        _ => Verdict::Reprompt,
    }
}

fn accept_range_start(answers: &mut Answers, input: &Input, env: &StepEnv<'_>) -> Verdict {
    let Some(text) = text(input) else {
        return Verdict::Reprompt;
    };
    match resolve_date_text(text, env.today) {
        Some(date) => {
            answers.range_start = Some(date);
            Verdict::Accept
        }
        None => Verdict::Retry(INVALID_DATE.to_string()),
    }
}

fn accept_range_end(answers: &mut Answers, input: &Input, env: &StepEnv<'_>) -> Verdict {
    let Some(text) = text(input) else {
        return Verdict::Reprompt;
    };
    let Some(end) = resolve_date_text(text, env.today) else {
        return Verdict::Retry(INVALID_DATE.to_string());
    };
    if answers.range_start.is_some_and(|start| end < start) {
        return Verdict::Retry("❌ Конечная дата не может быть раньше начальной.".to_string());
    }
    answers.range_end = Some(end);
    Verdict::Accept
}

// Prompts

fn prompt_time_date(view: &PromptView<'_>) -> Reply {
    let object = view
        .answers
        .object_name
        .as_ref()
        .map(|name| format!("🏗️ Объект: **{name}**\n\n"))
        .unwrap_or_default();
    let text = format!(
        "{object}📅 Выберите дату:\n\nИли введите дату в формате ДД.ММ.ГГ (сегодня: {})",
        format_date(view.env.today)
    );
    date_keyboard(text, false)
}

fn prompt_payment_date(view: &PromptView<'_>) -> Reply {
    let text = view.answers.object_name.as_ref().map_or_else(
        || "📅 Выберите дату оплаты:".to_string(),
        |name| format!("🏗️ Объект: **{name}**\n\n📅 Выберите дату оплаты:"),
    );
    date_keyboard(text, true)
}

fn prompt_manual_date(_view: &PromptView<'_>) -> Reply {
    Reply::text("📅 Введите дату (формат ДД.ММ.ГГ):\n\nНапример: 15.08.24").cancellable()
}

fn prompt_new_date(_view: &PromptView<'_>) -> Reply {
    Reply::text("📅 Введите новую дату (формат ДД.ММ.ГГ):").cancellable()
}

fn prompt_start_time(_view: &PromptView<'_>) -> Reply {
    Reply::text("🕐 Введите время начала работы (формат ЧЧ:ММ):\n\nНапример: 09:30, 14:00, 18:45")
        .cancellable()
}

fn prompt_end_time(_view: &PromptView<'_>) -> Reply {
    Reply::text(
        "🕐 Введите время окончания работы (формат ЧЧ:ММ):\n\nНапример: 17:30, 20:00, 22:45",
    )
    .cancellable()
}

fn prompt_object_choice(view: &PromptView<'_>) -> Reply {
    let mut reply = Reply::text("🏗️ Выберите объект или введите новый:");
    for object in view.objects.iter().take(view.env.settings.max_object_buttons) {
        reply = reply.button(format!("🔵 {}", object.name), Action::SelectObject(object.id));
    }
    reply
        .button("✏️ Ввести объект вручную", Action::ManualObject)
        .cancellable()
}

fn prompt_object_name(_view: &PromptView<'_>) -> Reply {
    Reply::text(
        "🏗️ Введите название объекта:\n\nНапример: ЖК Олимпийский, Дача Марина, Ремонт квартиры",
    )
    .cancellable()
}

fn prompt_comment(_view: &PromptView<'_>) -> Reply {
    Reply::text(
        "💬 Добавить комментарий? (необязательно)\n\n\
         Например: Монтаж труб, Покраска стен, Укладка плитки\n\
         Или отправьте 'нет' для пропуска",
    )
    .cancellable()
}

fn prompt_edit_comment(_view: &PromptView<'_>) -> Reply {
    Reply::text("💬 Введите новый комментарий (или 'нет' для удаления):").cancellable()
}

fn prompt_amount(view: &PromptView<'_>) -> Reply {
    let text = view.answers.object_name.as_ref().map_or_else(
        || "Введите сумму в рублях (целое число):".to_string(),
        |name| format!("🏗️ Объект: **{name}**\n\nВведите сумму в рублях (целое число):"),
    );
    Reply::text(text).cancellable()
}

fn prompt_new_amount(_view: &PromptView<'_>) -> Reply {
    Reply::text("Введите новую сумму в рублях:").cancellable()
}

fn prompt_hours(_view: &PromptView<'_>) -> Reply {
    Reply::text("Введите новое количество часов:").cancellable()
}

fn prompt_period(_view: &PromptView<'_>) -> Reply {
    Reply::text("Выберите период для отчёта:")
        .button(
            "📅 За прошлый месяц",
            Action::ReportPeriod(PeriodChoice::LastMonth),
        )
        .button(
            "📆 За произвольный период",
            Action::ReportPeriod(PeriodChoice::Custom),
        )
        .cancellable()
}

fn prompt_range_start(_view: &PromptView<'_>) -> Reply {
    Reply::text("📅 Введите начальную дату (формат ДД.ММ.ГГ):").cancellable()
}

fn prompt_range_end(_view: &PromptView<'_>) -> Reply {
    Reply::text("📅 Введите конечную дату (формат ДД.ММ.ГГ):").cancellable()
}

// Tables

const fn rule(step: Step, accept: AcceptFn, then: Transition, prompt: PromptFn) -> StepRule {
    StepRule {
        step,
        accept,
        then,
        prompt,
    }
}

static ADD_TIME: FlowGraph = FlowGraph {
    flow: Flow::AddTime,
    first: Step::Date,
    after_object: Transition::Goto(Step::Comment),
    cancelled: "❌ Добавление часов отменено.",
    title: "⏰ **Добавление часов работы**",
    rules: &[
        rule(Step::Date, accept_date, Transition::Goto(Step::StartTime), prompt_time_date),
        rule(
            Step::ManualDate,
            accept_manual_date,
            Transition::Goto(Step::StartTime),
            prompt_manual_date,
        ),
        rule(
            Step::StartTime,
            accept_start_time,
            Transition::Goto(Step::EndTime),
            prompt_start_time,
        ),
        rule(Step::EndTime, accept_end_time, Transition::ChooseObject, prompt_end_time),
        rule(
            Step::ObjectChoice,
            accept_object_choice,
            Transition::AfterObject,
            prompt_object_choice,
        ),
        rule(
            Step::ObjectName,
            accept_object_name,
            Transition::AfterObject,
            prompt_object_name,
        ),
        rule(Step::Comment, accept_comment, Transition::Commit, prompt_comment),
    ],
};

static ADD_PAYMENT: FlowGraph = FlowGraph {
    flow: Flow::AddPayment,
    first: Step::Amount,
    after_object: Transition::Commit,
    cancelled: "❌ Добавление оплаты отменено.",
    title: "💰 **Добавление оплаты**",
    rules: &[
        rule(Step::Amount, accept_amount, Transition::Goto(Step::Date), prompt_amount),
        rule(Step::Date, accept_date, Transition::ChooseObject, prompt_payment_date),
        rule(
            Step::ManualDate,
            accept_manual_date,
            Transition::ChooseObject,
            prompt_manual_date,
        ),
        rule(
            Step::ObjectChoice,
            accept_object_choice,
            Transition::AfterObject,
            prompt_object_choice,
        ),
        rule(
            Step::ObjectName,
            accept_object_name,
            Transition::AfterObject,
            prompt_object_name,
        ),
    ],
};

static EDIT_TIME: FlowGraph = FlowGraph {
    flow: Flow::EditTime,
    first: Step::Hours,
    after_object: Transition::Commit,
    cancelled: "❌ Редактирование отменено.",
    title: "✏️ **Редактирование записи часов**",
    rules: &[
        rule(Step::Hours, accept_hours, Transition::Goto(Step::Date), prompt_hours),
        rule(Step::Date, accept_plain_date, Transition::Goto(Step::Comment), prompt_new_date),
        rule(Step::Comment, accept_edit_comment, Transition::Commit, prompt_edit_comment),
    ],
};

static EDIT_PAYMENT: FlowGraph = FlowGraph {
    flow: Flow::EditPayment,
    first: Step::Amount,
    after_object: Transition::Commit,
    cancelled: "❌ Редактирование отменено.",
    title: "✏️ **Редактирование записи оплаты**",
    rules: &[
        rule(Step::Amount, accept_amount, Transition::Goto(Step::Date), prompt_new_amount),
        rule(Step::Date, accept_plain_date, Transition::Commit, prompt_new_date),
    ],
};

static REPORT: FlowGraph = FlowGraph {
    flow: Flow::Report,
    first: Step::Period,
    after_object: Transition::Commit,
    cancelled: "❌ Генерация отчёта отменена.",
    title: "📊 **Отчёты**",
    rules: &[
        rule(Step::Period, accept_period, Transition::Goto(Step::RangeStart), prompt_period),
        rule(
            Step::RangeStart,
            accept_range_start,
            Transition::Goto(Step::RangeEnd),
            prompt_range_start,
        ),
        rule(Step::RangeEnd, accept_range_end, Transition::Commit, prompt_range_end),
    ],
};

/// The table for `flow`.
#[must_use]
pub fn graph(flow: Flow) -> &'static FlowGraph {
    match flow {
        Flow::AddTime => &ADD_TIME,
        Flow::AddPayment => &ADD_PAYMENT,
        Flow::EditTime => &EDIT_TIME,
        Flow::EditPayment => &EDIT_PAYMENT,
        Flow::Report => &REPORT,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::{config::settings::TrackerSettings, test_utils::date};

    const FLOWS: [Flow; 5] = [
        Flow::AddTime,
        Flow::AddPayment,
        Flow::EditTime,
        Flow::EditPayment,
        Flow::Report,
    ];

    fn targets(graph: &FlowGraph) -> Vec<Step> {
        let mut steps = vec![graph.first];
        for rule in graph.rules {
            if let Transition::Goto(step) = rule.then {
                steps.push(step);
            }
        }
        steps
    }

    #[test]
    fn test_every_target_step_has_a_rule() {
        for flow in FLOWS {
            let graph = graph(flow);
            assert_eq!(graph.flow, flow);
            for step in targets(graph) {
                assert!(graph.rule(step).is_some(), "{flow:?} has no rule for {step:?}");
            }
        }
    }

    #[test]
    fn test_after_object_is_concrete() {
        for flow in FLOWS {
            let after = graph(flow).after_object;
            assert!(
                !matches!(after, Transition::AfterObject | Transition::ChooseObject),
                "{flow:?}"
            );
        }
    }

    #[test]
    fn test_object_steps_exist_where_objects_are_chosen() {
        for flow in FLOWS {
            let graph = graph(flow);
            if graph.rules.iter().any(|r| r.then == Transition::ChooseObject) {
                assert!(graph.rule(Step::ObjectChoice).is_some());
                assert!(graph.rule(Step::ObjectName).is_some());
            }
        }
    }

    #[test]
    fn test_date_step_choices() {
        let settings = TrackerSettings::default();
        let env = StepEnv {
            today: date(2024, 8, 15),
            settings: &settings,
        };
        let mut answers = Answers::default();

        let verdict = accept_date(
            &mut answers,
            &Input::Action(Action::PickDate(DateChoice::Yesterday)),
            &env,
        );
        assert_eq!(verdict, Verdict::Accept);
        assert_eq!(answers.date, Some(date(2024, 8, 14)));

        let verdict = accept_date(
            &mut answers,
            &Input::Action(Action::PickDate(DateChoice::Manual)),
            &env,
        );
        assert_eq!(verdict, Verdict::Jump(Transition::Goto(Step::ManualDate)));

        let verdict = accept_date(&mut answers, &Input::Text("31.13.24".to_string()), &env);
        assert!(matches!(verdict, Verdict::Retry(_)));
    }

    #[test]
    fn test_amount_is_whole_rubles() {
        let settings = TrackerSettings::default();
        let env = StepEnv {
            today: date(2024, 8, 15),
            settings: &settings,
        };
        let mut answers = Answers::default();

        for bad in ["0", "-5", "12.5", "abc", ""] {
            let verdict = accept_amount(&mut answers, &Input::Text(bad.to_string()), &env);
            assert!(matches!(verdict, Verdict::Retry(_)), "{bad}");
        }
        assert_eq!(answers.amount_kopecks, None);

        let verdict = accept_amount(&mut answers, &Input::Text(" 1500 ".to_string()), &env);
        assert_eq!(verdict, Verdict::Accept);
        assert_eq!(answers.amount_kopecks, Some(150_000));
    }

    #[test]
    fn test_edit_comment_clear_words() {
        let settings = TrackerSettings::default();
        let env = StepEnv {
            today: date(2024, 8, 15),
            settings: &settings,
        };
        let mut answers = Answers {
            comment: Some("old".to_string()),
            ..Answers::default()
        };

        accept_edit_comment(&mut answers, &Input::Text("Удалить".to_string()), &env);
        assert_eq!(answers.comment, None);

        accept_edit_comment(&mut answers, &Input::Text("Покраска".to_string()), &env);
        assert_eq!(answers.comment.as_deref(), Some("Покраска"));

        // "удалить" is only a clear word while editing
        accept_comment(&mut answers, &Input::Text("удалить".to_string()), &env);
        assert_eq!(answers.comment.as_deref(), Some("удалить"));
    }

    #[test]
    fn test_edit_hours_must_be_whole() {
        let settings = TrackerSettings::default();
        let env = StepEnv {
            today: date(2024, 8, 15),
            settings: &settings,
        };
        let mut answers = Answers::default();

        let verdict = accept_hours(&mut answers, &Input::Text("7.5".to_string()), &env);
        assert!(matches!(verdict, Verdict::Retry(_)));
        let verdict = accept_hours(&mut answers, &Input::Text("7".to_string()), &env);
        assert_eq!(verdict, Verdict::Accept);
        assert_eq!(answers.hours, Some(7.0));
    }
}
