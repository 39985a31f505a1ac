//! End-to-end flows: the client against the mock server with demo data.

mod support;

use std::sync::Arc;

use edu_client::api::{
    DifficultyLevel, LearningBlockUpdate, LoginRequest, NewLearningBlock, NewSubject,
    RegisterRequest, SubmittedAnswer, TestOptions, UserRole,
};
use edu_client::client::UploadFile;
use edu_client::db::repository::{AuthRepository, FullRepository};
use edu_client::db::seed::DEMO_PASSWORD;
use edu_client::db::LocalRepository;
use edu_client::{ApiClient, Session};
use serde_json::json;
use support::{client_for, spawn_demo_server, spawn_mock_server};

async fn logged_in(base_url: &str, email: &str) -> ApiClient {
    let client = client_for(base_url, Session::in_memory());
    client
        .auth()
        .login(&LoginRequest {
            email: email.into(),
            password: DEMO_PASSWORD.into(),
        })
        .await
        .expect("login");
    client
}

#[tokio::test]
async fn test_login_and_list_subjects() {
    let base_url = spawn_demo_server().await;
    let client = logged_in(&base_url, "student@demo.cz").await;

    assert!(client.session().is_authenticated());
    let subjects = client.subjects().get_all().await.unwrap();
    assert_eq!(subjects.len(), 4);
    assert!(subjects.iter().any(|s| s.id.as_str() == "physics"));
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let base_url = spawn_demo_server().await;
    let client = client_for(&base_url, Session::in_memory());

    let err = client.subjects().get_all().await.unwrap_err();
    assert!(err.is_unauthorized());
    let api_error = err.api_error().unwrap();
    assert_eq!(api_error.code, "UNAUTHORIZED");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let base_url = spawn_demo_server().await;
    let client = client_for(&base_url, Session::in_memory());

    let err = client
        .auth()
        .login(&LoginRequest {
            email: "student@demo.cz".into(),
            password: "wrong".into(),
        })
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_logout_revokes_token_on_the_server() {
    let base_url = spawn_demo_server().await;
    let client = logged_in(&base_url, "ucitel@demo.cz").await;

    client.auth().logout().await.unwrap();
    // The token is still held locally; the next call fails and tears it down.
    assert!(client.session().is_authenticated());
    let err = client.subjects().get_all().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_refresh_replaces_token() {
    let base_url = spawn_demo_server().await;
    let client = logged_in(&base_url, "ucitel@demo.cz").await;
    let old = client.session().token().unwrap();

    let refreshed = client.auth().refresh_token().await.unwrap();
    assert_ne!(refreshed.token, old);

    let fresh = client_for(&base_url, Session::with_token(refreshed.token));
    assert!(fresh.subjects().get_all().await.is_ok());
    assert!(client.subjects().get_all().await.is_err());
}

#[tokio::test]
async fn test_register_then_login() {
    let base_url = spawn_demo_server().await;
    let client = client_for(&base_url, Session::in_memory());

    let registered = client
        .auth()
        .register(&RegisterRequest {
            email: "novak@school.cz".into(),
            password: "tajne".into(),
            name: "Jan Novák".into(),
            role: UserRole::Student,
        })
        .await
        .unwrap();
    assert_eq!(registered.user.role, UserRole::Student);

    let duplicate = client
        .auth()
        .register(&RegisterRequest {
            email: "NOVAK@school.cz".into(),
            password: "x".into(),
            name: "Other".into(),
            role: UserRole::Student,
        })
        .await
        .unwrap_err();
    assert_eq!(duplicate.status().map(|s| s.as_u16()), Some(409));

    let response = client
        .auth()
        .login(&LoginRequest {
            email: "novak@school.cz".into(),
            password: "tajne".into(),
        })
        .await
        .unwrap();
    assert_eq!(response.user.id, registered.user.id);
}

#[tokio::test]
async fn test_password_reset_flow() {
    let repo: Arc<dyn FullRepository> = Arc::new(LocalRepository::with_demo_data());
    let base_url = spawn_mock_server(Arc::clone(&repo)).await;
    let client = client_for(&base_url, Session::in_memory());

    let ack = client.auth().forgot_password("anna@school.cz").await.unwrap();
    assert!(!ack.message.is_empty());
    // Unknown addresses get the same answer.
    assert!(client.auth().forgot_password("nobody@school.cz").await.is_ok());

    let reset_token = repo
        .create_reset_token("anna@school.cz")
        .await
        .unwrap()
        .unwrap();
    client
        .auth()
        .reset_password(&reset_token, "nove-heslo")
        .await
        .unwrap();
    // Tokens are single use.
    let reused = client.auth().reset_password(&reset_token, "x").await;
    assert!(reused.is_err());

    let login = client
        .auth()
        .login(&LoginRequest {
            email: "anna@school.cz".into(),
            password: "nove-heslo".into(),
        })
        .await;
    assert!(login.is_ok());
}

#[tokio::test]
async fn test_subject_crud_and_material_upload() {
    let base_url = spawn_demo_server().await;
    let client = logged_in(&base_url, "ucitel@demo.cz").await;
    let subjects = client.subjects();

    let created = subjects
        .create(&NewSubject {
            name: "Dějepis".into(),
            grade: 7,
            teacher_id: None,
        })
        .await
        .unwrap();
    assert_eq!(created.teacher_id.as_str(), "demo-teacher");

    let upload = UploadFile::from_bytes("osnova.pdf", vec![1u8; 1000]).with_mime("application/pdf");
    let material = subjects
        .upload_material(&created.id, upload, None)
        .await
        .unwrap();
    assert_eq!(material.name, "osnova.pdf");
    assert_eq!(material.metadata["size"], json!(1000));
    assert_eq!(material.metadata["contentType"], json!("application/pdf"));

    let fetched = subjects.get_by_id(&created.id).await.unwrap();
    assert_eq!(fetched.name, "Dějepis");

    let ack = subjects.delete(&created.id).await.unwrap();
    assert!(ack.is_some());
    let err = subjects.get_by_id(&created.id).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.api_error().unwrap().code, "NOT_FOUND");
}

#[tokio::test]
async fn test_blocks_are_ordered_and_order_is_unique() {
    let base_url = spawn_demo_server().await;
    let client = logged_in(&base_url, "ucitel@demo.cz").await;
    let blocks = client.learning_blocks();

    let physics = blocks.get_by_subject("physics").await.unwrap();
    let orders: Vec<u32> = physics.iter().map(|b| b.order).collect();
    assert_eq!(orders, vec![1, 2, 3]);

    let new_block = NewLearningBlock {
        subject_id: "physics".into(),
        title: "Optika".into(),
        description: "Světlo a čočky".into(),
        estimated_duration: 40,
        difficulty: DifficultyLevel::Medium,
        learning_objectives: vec!["Popsat lom světla".into()],
        activities: vec![],
        order: 2,
    };
    let err = blocks.create(&new_block).await.unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(409));

    let created = blocks
        .create(&NewLearningBlock {
            order: 4,
            ..new_block
        })
        .await
        .unwrap();
    let updated = blocks
        .update(
            &created.id,
            &LearningBlockUpdate {
                title: Some("Optika a světlo".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "Optika a světlo");
    assert_eq!(updated.order, 4);

    assert!(blocks.delete(&created.id).await.unwrap().is_some());
    assert_eq!(blocks.get_by_subject("physics").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_scenario_generation() {
    let base_url = spawn_demo_server().await;
    let client = logged_in(&base_url, "ucitel@demo.cz").await;

    let scenario = client
        .learning_blocks()
        .generate_scenario("physics-gravity", "s1")
        .await
        .unwrap();
    assert_eq!(scenario.block_id.as_str(), "physics-gravity");
    assert_eq!(scenario.student_id.as_str(), "s1");
    assert!(!scenario.activities.is_empty());

    let err = client
        .learning_blocks()
        .generate_scenario("physics-gravity", "demo-teacher")
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
}

#[tokio::test]
async fn test_generate_submit_and_fetch_results() {
    let base_url = spawn_demo_server().await;
    let client = logged_in(&base_url, "student@demo.cz").await;
    let tests = client.tests();

    let before = tests
        .get_test_results("demo-student", Some("physics-gravity"))
        .await
        .unwrap();

    let test = tests
        .generate_test(
            "physics-gravity",
            "demo-student",
            Some(TestOptions {
                question_count: Some(2),
                ..Default::default()
            }),
        )
        .await
        .unwrap();
    assert_eq!(test.questions.len(), 2);
    assert_eq!(tests.get_test_by_id(&test.id).await.unwrap(), test);

    let answers = vec![
        SubmittedAnswer {
            question_id: test.questions[0].id.clone(),
            user_answer: json!("9.81 N/kg"),
            time_spent: 20,
        },
        SubmittedAnswer {
            question_id: test.questions[1].id.clone(),
            user_answer: json!("no"),
            time_spent: 15,
        },
    ];
    let result = tests.submit_test(&test.id, answers).await.unwrap();
    assert_eq!(result.student_id.as_str(), "demo-student");
    assert_eq!(result.score, f64::from(test.questions[0].points));
    assert_eq!(result.max_score, f64::from(test.max_score()));
    assert_eq!(result.time_spent, 35);

    let after = tests
        .get_test_results("demo-student", Some("physics-gravity"))
        .await
        .unwrap();
    assert_eq!(after.len(), before.len() + 1);
    assert!(after.iter().any(|r| r.id == result.id));

    // Other blocks are filtered out.
    let other = tests
        .get_test_results("demo-student", Some("physics-energy"))
        .await
        .unwrap();
    assert!(other.iter().all(|r| r.id != result.id));
}

#[tokio::test]
async fn test_submitting_unknown_question_is_bad_request() {
    let base_url = spawn_demo_server().await;
    let client = logged_in(&base_url, "student@demo.cz").await;

    let test = client
        .tests()
        .generate_test("physics-gravity", "demo-student", None)
        .await
        .unwrap();
    let err = client
        .tests()
        .submit_test(
            &test.id,
            vec![SubmittedAnswer {
                question_id: "bogus".into(),
                user_answer: json!(1),
                time_spent: 1,
            }],
        )
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
}

#[tokio::test]
async fn test_game_state_and_answers() {
    let base_url = spawn_demo_server().await;
    let client = logged_in(&base_url, "student@demo.cz").await;
    let game = client.game();

    let mut state = game.get_game_state("demo-student").await.unwrap();
    assert_eq!(state.stats.total_xp, 2540);

    state.stats.total_xp += 50;
    let saved = game.update_game_state("demo-student", &state).await.unwrap();
    assert_eq!(saved.stats.total_xp, 2590);
    assert_eq!(
        game.get_game_state("demo-student").await.unwrap().stats.total_xp,
        2590
    );

    let mismatch = game.update_game_state("s1", &state).await.unwrap_err();
    assert_eq!(mismatch.status().map(|s| s.as_u16()), Some(400));

    let outcome = game
        .submit_answer("gravity-quiz", json!("9.81 N/kg"))
        .await
        .unwrap();
    assert!(outcome.correct);
    assert_eq!(outcome.points_awarded, 50);

    let wrong = game.submit_answer("gravity-quiz", json!("3 N/kg")).await.unwrap();
    assert!(!wrong.correct);

    assert!(game.submit_answer("nope", json!("x")).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_new_student_gets_initial_state() {
    let base_url = spawn_demo_server().await;
    let client = client_for(&base_url, Session::in_memory());
    let registered = client
        .auth()
        .register(&RegisterRequest {
            email: "petr@school.cz".into(),
            password: "pw".into(),
            name: "Petr".into(),
            role: UserRole::Student,
        })
        .await
        .unwrap();
    client.session().set_token(&registered.token).unwrap();

    let state = client.game().get_game_state(&registered.user.id).await.unwrap();
    assert_eq!(state.stats.level, 1);
    assert_eq!(state.stats.total_xp, 0);
    assert!(client
        .game()
        .get_achievements(&registered.user.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_leaderboard() {
    let base_url = spawn_demo_server().await;
    let client = logged_in(&base_url, "student@demo.cz").await;

    let board = client.game().get_leaderboard(None).await.unwrap();
    let ids: Vec<&str> = board.iter().map(|e| e.student_id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "demo-student", "s3", "s2"]);
    assert_eq!(board[0].rank, 1);

    let math = client.game().get_leaderboard(Some("math")).await.unwrap();
    assert!(math.is_empty());
}

#[tokio::test]
async fn test_analytics_endpoints() {
    let base_url = spawn_demo_server().await;
    let client = logged_in(&base_url, "ucitel@demo.cz").await;
    let analytics = client.analytics();

    let class = analytics.get_class_analysis("physics").await.unwrap();
    assert_eq!(class.class_id, "physics");
    assert_eq!(class.student_count, 4);

    let style = analytics.get_learning_style_analysis("s1").await.unwrap();
    assert_eq!(style.dominant_style, "visual");

    let prediction = analytics.get_performance_prediction("s1").await.unwrap();
    assert!((prediction.expected_score - 85.0).abs() < 1e-9);

    let risks = analytics.get_risk_analysis("s2").await.unwrap();
    assert!(!risks.is_empty());

    let full = analytics.get_student_analysis("s2").await.unwrap();
    assert_eq!(full.learning_style_analysis.dominant_style, "kinesthetic");
    assert!(!full.personalized_feedback.is_empty());

    let err = analytics.get_class_analysis("unknown").await.unwrap_err();
    assert!(err.is_not_found());
}
