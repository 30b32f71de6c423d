use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Classroom::Table)
                    .if_not_exists()
                    .col(string_len(Classroom::Id, 36).primary_key())
                    .col(string_len(Classroom::Name, 200))
                    .col(string_len(Classroom::TeacherId, 64))
                    .col(string_len(Classroom::SecretCode, 6).unique_key())
                    .col(timestamp(Classroom::CreatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClassroomStudent::Table)
                    .if_not_exists()
                    .col(string_len(ClassroomStudent::ClassroomId, 36))
                    .col(string_len(ClassroomStudent::StudentId, 64))
                    .col(
                        timestamp(ClassroomStudent::JoinedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(ClassroomStudent::ClassroomId)
                            .col(ClassroomStudent::StudentId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-classroom_students-classroom_id")
                            .from(ClassroomStudent::Table, ClassroomStudent::ClassroomId)
                            .to(Classroom::Table, Classroom::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Assignment::Table)
                    .if_not_exists()
                    .col(string_len(Assignment::Id, 36).primary_key())
                    .col(string_len(Assignment::ClassroomId, 36))
                    .col(string_len(Assignment::Title, 200))
                    .col(timestamp(Assignment::CreatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-assignments-classroom_id")
                            .from(Assignment::Table, Assignment::ClassroomId)
                            .to(Classroom::Table, Classroom::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Submission::Table)
                    .if_not_exists()
                    .col(string_len(Submission::Id, 36).primary_key())
                    .col(string_len(Submission::AssignmentId, 36))
                    .col(string_len(Submission::StudentId, 64))
                    // Base64 image payload as sent by the client.
                    .col(text(Submission::FileData))
                    .col(string_len(Submission::FileName, 255))
                    // Grading document JSON, stored verbatim.
                    .col(text_null(Submission::Evaluation))
                    .col(
                        small_integer_null(Submission::OverallScore)
                            .check(Expr::col(Submission::OverallScore).gte(0))
                            .check(Expr::col(Submission::OverallScore).lte(100)),
                    )
                    .col(boolean(Submission::IsGraded).default(false))
                    .col(timestamp(Submission::SubmittedAt).default(Expr::current_timestamp()))
                    .col(timestamp(Submission::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-submissions-assignment_id")
                            .from(Submission::Table, Submission::AssignmentId)
                            .to(Assignment::Table, Assignment::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assignments_classroom_id")
                    .table(Assignment::Table)
                    .col(Assignment::ClassroomId)
                    .to_owned(),
            )
            .await?;

        // One live submission per student and assignment.
        manager
            .create_index(
                Index::create()
                    .name("idx_submissions_assignment_id_student_id")
                    .table(Submission::Table)
                    .col(Submission::AssignmentId)
                    .col(Submission::StudentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Submission::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Assignment::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ClassroomStudent::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Classroom::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Classroom {
    Table,
    Id,
    Name,
    TeacherId,
    SecretCode,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ClassroomStudent {
    Table,
    ClassroomId,
    StudentId,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Assignment {
    Table,
    Id,
    ClassroomId,
    Title,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Submission {
    Table,
    Id,
    AssignmentId,
    StudentId,
    FileData,
    FileName,
    Evaluation,
    OverallScore,
    IsGraded,
    SubmittedAt,
    UpdatedAt,
}
