use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建用户表
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Users::UpdatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // 创建 API 密钥表
        manager
            .create_table(
                Table::create()
                    .table(ApiKeys::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApiKeys::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ApiKeys::UserId).big_integer().not_null())
                    .col(ColumnDef::new(ApiKeys::Name).string().not_null())
                    .col(
                        ColumnDef::new(ApiKeys::KeyHash)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ApiKeys::LastUsed).big_integer().null())
                    .col(ColumnDef::new(ApiKeys::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(ApiKeys::Table, ApiKeys::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建周期作业表
        manager
            .create_table(
                Table::create()
                    .table(RecurringAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecurringAssignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::Title)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::Subject)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::Priority)
                            .string()
                            .not_null()
                            .default("medium"),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::RecurrenceType)
                            .string()
                            .not_null()
                            .default("none"),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::RecurrenceInterval)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::RecurrenceWeekday)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::RecurrenceDay)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::DueTime)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::EndType)
                            .string()
                            .not_null()
                            .default("never"),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::EndCount)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::EndDate)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::GeneratedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::EditBehavior)
                            .string()
                            .not_null()
                            .default("this_only"),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::ReminderEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::ReminderOffset)
                            .integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::UrgentReminderEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(RecurringAssignments::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(RecurringAssignments::Table, RecurringAssignments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建作业表
        manager
            .create_table(
                Table::create()
                    .table(Assignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assignments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Assignments::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Assignments::Title).string().not_null())
                    .col(
                        ColumnDef::new(Assignments::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Assignments::Subject)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Assignments::Priority)
                            .string()
                            .not_null()
                            .default("medium"),
                    )
                    .col(ColumnDef::new(Assignments::DueDate).big_integer().not_null())
                    .col(
                        ColumnDef::new(Assignments::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Assignments::CompletedAt).big_integer().null())
                    .col(
                        ColumnDef::new(Assignments::IsArchived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Assignments::ReminderEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Assignments::ReminderAt).big_integer().null())
                    .col(
                        ColumnDef::new(Assignments::ReminderSent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Assignments::UrgentReminderEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Assignments::LastUrgentReminderSent)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Assignments::RecurringAssignmentId)
                            .big_integer()
                            .null(),
                    )
                    .col(ColumnDef::new(Assignments::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Assignments::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Assignments::Table, Assignments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // 删除周期作业只断开关联，不删除已生成的作业
                    .foreign_key(
                        ForeignKey::create()
                            .from(Assignments::Table, Assignments::RecurringAssignmentId)
                            .to(RecurringAssignments::Table, RecurringAssignments::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // 创建索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_api_keys_user_id")
                    .table(ApiKeys::Table)
                    .col(ApiKeys::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_recurring_assignments_user_id")
                    .table(RecurringAssignments::Table)
                    .col(RecurringAssignments::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assignments_user_id_due_date")
                    .table(Assignments::Table)
                    .col(Assignments::UserId)
                    .col(Assignments::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assignments_recurring_assignment_id")
                    .table(Assignments::Table)
                    .col(Assignments::RecurringAssignmentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_assignments_is_archived")
                    .table(Assignments::Table)
                    .col(Assignments::IsArchived)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 按照创建的相反顺序删除
        manager
            .drop_table(Table::drop().table(Assignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecurringAssignments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ApiKeys::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    Name,
    PasswordHash,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ApiKeys {
    Table,
    Id,
    UserId,
    Name,
    KeyHash,
    LastUsed,
    CreatedAt,
}

#[derive(DeriveIden)]
enum RecurringAssignments {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Subject,
    Priority,
    RecurrenceType,
    RecurrenceInterval,
    RecurrenceWeekday,
    RecurrenceDay,
    DueTime,
    EndType,
    EndCount,
    EndDate,
    GeneratedCount,
    EditBehavior,
    ReminderEnabled,
    ReminderOffset,
    UrgentReminderEnabled,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Assignments {
    Table,
    Id,
    UserId,
    Title,
    Description,
    Subject,
    Priority,
    DueDate,
    IsCompleted,
    CompletedAt,
    IsArchived,
    ReminderEnabled,
    ReminderAt,
    ReminderSent,
    UrgentReminderEnabled,
    LastUrgentReminderSent,
    RecurringAssignmentId,
    CreatedAt,
    UpdatedAt,
}
