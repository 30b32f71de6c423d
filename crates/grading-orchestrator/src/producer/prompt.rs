//! 发送给评分模型的固定指令与输出结构约束。

use serde_json::{Value, json};

/// 系统指令：要求模型以双语 JSON 文档的形式给出逐题评分。
pub const GRADING_INSTRUCTION: &str = r#"You are an assistant to a math teacher and you grade scanned, handwritten math homework (Israeli Bagrut Math B, questionnaire 35381 style).

Read the attached image of the student's work, find every separate problem and grade each one. Reply with exactly one JSON object and nothing else.

Every text meant for display must be bilingual: an object with an English "en" value and a Hebrew "he" value.

Top level keys:
- "overall_score": integer grade for the whole test, 0 to 100.
- "problem_breakdown": array with one entry per problem.

Each problem entry:
- "problem_description": bilingual short title, e.g. {"en": "Question 1: Solving a linear equation", "he": "שאלה 1: פתרון משוואה לינארית"}.
- "score": points the student earned on this problem.
- "max_score": points available for this problem, e.g. 25.
- "feedback": bilingual note addressed to the student explaining the score and how to improve.
- "teacher_recommendation": bilingual note addressed to the teacher about what the student understood, where they struggled and what to reinforce.
- "errors": array of mistakes; an empty array when the solution is perfect.

Each error entry:
- "error_type": one of "minor_slip", "procedural_error", "conceptual_error".
- "deduction": positive integer number of points taken off.
- "explanation": bilingual explanation quoting the concrete wrong step, e.g. "5 * 8 was written as 35 instead of 40."
- "hint": bilingual, actionable advice for avoiding this kind of mistake.
- "boundingBox": {"x", "y", "width", "height"} locating the mistake, each a fraction of the image size between 0 and 1, origin at the top-left corner.

Deduction rubric:
- minor_slip (arithmetic, copying or sign mistakes): 1-3 points.
- procedural_error (a known procedure applied incorrectly, e.g. distribution or order of operations): 4-7 points.
- conceptual_error (a misunderstood concept, wrong formula or broken logic): 8-15 points."#;

/// 随图片一起发送的用户指令。
pub const USER_INSTRUCTION: &str =
    "Grade the student's work in this image following the system instruction.";

fn bilingual_schema(description: &str) -> Value {
    json!({
        "type": "OBJECT",
        "description": description,
        "properties": {
            "en": { "type": "STRING" },
            "he": { "type": "STRING" }
        },
        "required": ["en", "he"]
    })
}

/// 评分文档的响应结构（Gemini `responseSchema` 格式）。
pub fn response_schema() -> Value {
    let error_schema = json!({
        "type": "OBJECT",
        "properties": {
            "error_type": {
                "type": "STRING",
                "enum": ["minor_slip", "procedural_error", "conceptual_error"]
            },
            "deduction": { "type": "INTEGER", "description": "Points deducted for the error." },
            "explanation": bilingual_schema("Explanation of the error with a concrete example from the work."),
            "hint": bilingual_schema("Actionable hint for avoiding the mistake."),
            "boundingBox": {
                "type": "OBJECT",
                "properties": {
                    "x": { "type": "NUMBER" },
                    "y": { "type": "NUMBER" },
                    "width": { "type": "NUMBER" },
                    "height": { "type": "NUMBER" }
                },
                "required": ["x", "y", "width", "height"]
            }
        },
        "required": ["error_type", "deduction", "explanation", "hint", "boundingBox"]
    });

    let problem_schema = json!({
        "type": "OBJECT",
        "properties": {
            "problem_description": bilingual_schema("Short description of the problem."),
            "score": { "type": "INTEGER" },
            "max_score": { "type": "INTEGER" },
            "feedback": bilingual_schema("Feedback for the student."),
            "teacher_recommendation": bilingual_schema("Recommendations for the teacher."),
            "errors": {
                "type": "ARRAY",
                "description": "Mistakes found in this problem.",
                "items": error_schema
            }
        },
        "required": [
            "problem_description",
            "score",
            "max_score",
            "feedback",
            "teacher_recommendation",
            "errors"
        ]
    });

    json!({
        "type": "OBJECT",
        "properties": {
            "overall_score": {
                "type": "INTEGER",
                "description": "Overall grade from 0 to 100."
            },
            "problem_breakdown": {
                "type": "ARRAY",
                "description": "One analysis per problem.",
                "items": problem_schema
            }
        },
        "required": ["overall_score", "problem_breakdown"]
    })
}
